#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Builders for synthetic GDELT export archives and a shared tracing setup.

use geolens_gdelt::EVENT_COLUMNS;
use std::io::{Cursor, Write};
use std::sync::Once;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// One export row, with the columns the pipeline reads filled in.
#[derive(Clone, Debug)]
pub struct Row {
    pub id: String,
    pub date_added: String,
    pub lat: String,
    pub lon: String,
    pub tone: String,
    pub source_url: Option<String>,
}

impl Row {
    pub fn new(id: &str, date_added: &str) -> Self {
        Self {
            id: id.to_string(),
            date_added: date_added.to_string(),
            lat: "48.8566".to_string(),
            lon: "2.3522".to_string(),
            tone: "-2.5".to_string(),
            source_url: Some(format!("https://ex.com/story-{id}")),
        }
    }

    pub fn with_source_url(mut self, url: Option<&str>) -> Self {
        self.source_url = url.map(str::to_string);
        self
    }

    pub fn to_line(&self) -> String {
        let mut fields = vec![String::new(); EVENT_COLUMNS.len()];
        let mut set = |name: &str, value: &str| {
            let index = EVENT_COLUMNS
                .iter()
                .position(|c| *c == name)
                .expect("known column");
            fields[index] = value.to_string();
        };
        set("GLOBALEVENTID", &self.id);
        set("SQLDATE", "20240103");
        set("Actor1Name", "POLICE");
        set("Actor2Name", "PROTESTER");
        set("EventCode", "145");
        set("EventRootCode", "14");
        set("QuadClass", "3");
        set("GoldsteinScale", "-6.5");
        set("NumMentions", "10");
        set("NumSources", "2");
        set("NumArticles", "10");
        set("AvgTone", &self.tone);
        set("ActionGeo_FullName", "Paris, Ile-de-France, France");
        set("ActionGeo_Lat", &self.lat);
        set("ActionGeo_Long", &self.lon);
        set("DATEADDED", &self.date_added);
        if let Some(url) = &self.source_url {
            set("SOURCEURL", url);
        }
        if self.source_url.is_none() {
            // Pre-2013 layout: no SOURCEURL column at all.
            fields.pop();
        }
        fields.join("\t")
    }
}

/// Zips `lines` as the single entry of a daily export archive.
pub fn export_zip(lines: &[String]) -> Vec<u8> {
    let raw: Vec<Vec<u8>> = lines.iter().map(|l| l.as_bytes().to_vec()).collect();
    export_zip_bytes(&raw)
}

/// Like [`export_zip`], for lines that are not valid UTF-8.
pub fn export_zip_bytes(lines: &[Vec<u8>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("20240103.export.CSV", SimpleFileOptions::default())
        .unwrap();
    for line in lines {
        writer.write_all(line).unwrap();
        writer.write_all(b"\n").unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn rows_zip(rows: &[Row]) -> Vec<u8> {
    let lines: Vec<String> = rows.iter().map(Row::to_line).collect();
    export_zip(&lines)
}
