//! # External Service Providers
//!
//! Clients for the third-party services the pipeline depends on: language models
//! under [`ai`] (with [`factory`] choosing one from configuration) and geocoders
//! under [`geo`].

pub mod ai;
pub mod factory;
pub mod geo;
