//! # GeoLens
//!
//! Core library for turning daily event feeds into mappable GeoJSON.
//!
//! The pipeline is a one-way chain of stages:
//!
//! 1. A feed plugin (see the `geolens-gdelt` and `geolens-x` crates) implements
//!    [`fetch::EventFetcher`] and produces [`types::RawEvent`]s.
//! 2. [`summarizer::EventSummarizer`] asks an [`providers::ai::AiProvider`] for a short
//!    summary of each event and produces [`types::SummaryRecord`]s.
//! 3. [`geojson`] converts the summaries into a feature collection and writes it to disk.
//!
//! Shared plumbing used by the plugins lives here too: the geocoding client, the
//! outbound-call [`pacing::Pacer`], the operator [`interrupt::Interrupt`] and the
//! optional [`debug::DebugArtifacts`] writer.

pub mod constants;
pub mod debug;
pub mod errors;
pub mod fetch;
pub mod geojson;
pub mod interrupt;
pub mod pacing;
pub mod prompts;
pub mod providers;
pub mod summarizer;
pub mod types;

pub use errors::PromptError;
pub use fetch::{EventFetcher, FetchCriteria, FetchError};
pub use interrupt::Interrupt;
pub use pacing::Pacer;
pub use summarizer::EventSummarizer;
pub use types::{Location, MetaValue, Metadata, RawEvent, SummaryRecord};
