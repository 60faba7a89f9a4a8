//! The GDELT 1.0 daily event export layout and the row → [`RawEvent`] mapping.

use geolens::types::{MetaValue, Metadata, RawEvent, SOURCE_URL_KEY};

/// Column names of the daily event export, in file order.
///
/// Exports from April 2013 onwards append `SOURCEURL` as a 58th column; older
/// files stop at `DATEADDED`.
pub const EVENT_COLUMNS: [&str; 58] = [
    "GLOBALEVENTID",
    "SQLDATE",
    "MonthYear",
    "Year",
    "FractionDate",
    "Actor1Code",
    "Actor1Name",
    "Actor1CountryCode",
    "Actor1KnownGroupCode",
    "Actor1EthnicCode",
    "Actor1Religion1Code",
    "Actor1Religion2Code",
    "Actor1Type1Code",
    "Actor1Type2Code",
    "Actor1Type3Code",
    "Actor2Code",
    "Actor2Name",
    "Actor2CountryCode",
    "Actor2KnownGroupCode",
    "Actor2EthnicCode",
    "Actor2Religion1Code",
    "Actor2Religion2Code",
    "Actor2Type1Code",
    "Actor2Type2Code",
    "Actor2Type3Code",
    "IsRootEvent",
    "EventCode",
    "EventBaseCode",
    "EventRootCode",
    "QuadClass",
    "GoldsteinScale",
    "NumMentions",
    "NumSources",
    "NumArticles",
    "AvgTone",
    "Actor1Geo_Type",
    "Actor1Geo_FullName",
    "Actor1Geo_CountryCode",
    "Actor1Geo_ADM1Code",
    "Actor1Geo_Lat",
    "Actor1Geo_Long",
    "Actor1Geo_FeatureID",
    "Actor2Geo_Type",
    "Actor2Geo_FullName",
    "Actor2Geo_CountryCode",
    "Actor2Geo_ADM1Code",
    "Actor2Geo_Lat",
    "Actor2Geo_Long",
    "Actor2Geo_FeatureID",
    "ActionGeo_Type",
    "ActionGeo_FullName",
    "ActionGeo_CountryCode",
    "ActionGeo_ADM1Code",
    "ActionGeo_Lat",
    "ActionGeo_Long",
    "ActionGeo_FeatureID",
    "DATEADDED",
    "SOURCEURL",
];

/// Field count of pre-2013 exports (no `SOURCEURL`).
pub const LEGACY_FIELD_COUNT: usize = 57;

const GLOBAL_EVENT_ID: usize = 0;
const SQL_DATE: usize = 1;
const ACTOR1_NAME: usize = 6;
const ACTOR1_COUNTRY: usize = 7;
const ACTOR2_NAME: usize = 16;
const ACTOR2_COUNTRY: usize = 17;
const EVENT_CODE: usize = 26;
const EVENT_ROOT_CODE: usize = 28;
const QUAD_CLASS: usize = 29;
const GOLDSTEIN_SCALE: usize = 30;
const NUM_MENTIONS: usize = 31;
const NUM_SOURCES: usize = 32;
const NUM_ARTICLES: usize = 33;
const AVG_TONE: usize = 34;
const ACTION_GEO_FULL_NAME: usize = 50;
const ACTION_GEO_LAT: usize = 53;
const ACTION_GEO_LONG: usize = 54;
const DATE_ADDED: usize = 56;
const SOURCE_URL: usize = 57;

/// One parsed export row, paired with the key used for sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub date_added: i64,
    pub event: RawEvent,
}

fn field<'a>(fields: &[&'a str], index: usize) -> Option<&'a str> {
    fields
        .get(index)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn parse_optional<T: std::str::FromStr>(
    fields: &[&str],
    index: usize,
) -> Result<Option<T>, String> {
    match field(fields, index) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("{} is not a number: '{raw}'", EVENT_COLUMNS[index])),
    }
}

/// Builds the human-readable description of an event.
///
/// Missing parts are left out, e.g. `"POLICE (event 190) in Lagos, Nigeria"`.
pub fn describe(
    actor1: Option<&str>,
    actor2: Option<&str>,
    event_code: Option<&str>,
    place: Option<&str>,
) -> String {
    let actors: Vec<&str> = [actor1, actor2].into_iter().flatten().collect();
    let mut parts = Vec::new();
    if !actors.is_empty() {
        parts.push(actors.join(" / "));
    }
    if let Some(code) = event_code {
        parts.push(format!("(event {code})"));
    }
    let mut description = parts.join(" ");
    if let Some(place) = place {
        if description.is_empty() {
            description = format!("Event in {place}");
        } else {
            description.push_str(&format!(" in {place}"));
        }
    }
    if description.is_empty() {
        description = "Unspecified event".to_string();
    }
    description
}

/// Maps one tab-separated record to an [`EventRow`].
///
/// Returns a reason string for rows that must be skipped: a field count other
/// than 57 or 58, a missing id, date or `DATEADDED`, or a non-numeric value in
/// a numeric column.
pub fn parse_row(fields: &[&str]) -> Result<EventRow, String> {
    if fields.len() != EVENT_COLUMNS.len() && fields.len() != LEGACY_FIELD_COUNT {
        return Err(format!(
            "expected {} or {} fields, found {}",
            LEGACY_FIELD_COUNT,
            EVENT_COLUMNS.len(),
            fields.len()
        ));
    }

    let id = field(fields, GLOBAL_EVENT_ID).ok_or("missing GLOBALEVENTID")?;
    let date = field(fields, SQL_DATE).ok_or("missing SQLDATE")?;
    let date_added: i64 =
        parse_optional(fields, DATE_ADDED)?.ok_or("missing DATEADDED")?;

    let latitude: Option<f64> = parse_optional(fields, ACTION_GEO_LAT)?;
    let longitude: Option<f64> = parse_optional(fields, ACTION_GEO_LONG)?;
    let tone: Option<f64> = parse_optional(fields, AVG_TONE)?;
    let goldstein: Option<f64> = parse_optional(fields, GOLDSTEIN_SCALE)?;
    let quad_class: Option<i64> = parse_optional(fields, QUAD_CLASS)?;
    let num_mentions: Option<i64> = parse_optional(fields, NUM_MENTIONS)?;
    let num_sources: Option<i64> = parse_optional(fields, NUM_SOURCES)?;
    let num_articles: Option<i64> = parse_optional(fields, NUM_ARTICLES)?;

    let actor1 = field(fields, ACTOR1_NAME);
    let actor2 = field(fields, ACTOR2_NAME);
    let event_code = field(fields, EVENT_CODE);
    let place = field(fields, ACTION_GEO_FULL_NAME);

    let mut metadata = Metadata::new();
    let mut put = |key: &str, value: Option<MetaValue>| {
        if let Some(value) = value {
            metadata.insert(key.to_string(), value);
        }
    };
    put("actor1_name", actor1.map(MetaValue::from));
    put("actor2_name", actor2.map(MetaValue::from));
    put("actor1_country", field(fields, ACTOR1_COUNTRY).map(MetaValue::from));
    put("actor2_country", field(fields, ACTOR2_COUNTRY).map(MetaValue::from));
    put("event_code", event_code.map(MetaValue::from));
    put(
        "event_root_code",
        field(fields, EVENT_ROOT_CODE).map(MetaValue::from),
    );
    put("quad_class", quad_class.map(MetaValue::from));
    put("goldstein_scale", goldstein.map(MetaValue::from));
    put("num_mentions", num_mentions.map(MetaValue::from));
    put("num_sources", num_sources.map(MetaValue::from));
    put("num_articles", num_articles.map(MetaValue::from));
    put("date_added", Some(MetaValue::from(date_added)));
    put(SOURCE_URL_KEY, field(fields, SOURCE_URL).map(MetaValue::from));

    Ok(EventRow {
        date_added,
        event: RawEvent {
            id: id.to_string(),
            date: date.to_string(),
            description: describe(actor1, actor2, event_code, place),
            location: place.map(str::to_string),
            latitude,
            longitude,
            tone,
            metadata,
        },
    })
}
