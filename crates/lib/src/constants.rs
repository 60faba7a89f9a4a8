//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! multiple crates in the `geolens` workspace. Using these constants helps to avoid
//! "magic strings" and ensures consistency.

/// The User-Agent sent to every third-party service.
pub const USER_AGENT: &str = "GeoLensAI/1.0";

/// The root directory for optional debug artifacts.
pub const DEBUG_DIR: &str = "data";

/// Sub-directory of [`DEBUG_DIR`] for raw GDELT downloads.
pub const GDELT_DEBUG_SUBDIR: &str = "gdelt_downloads";

/// Sub-directory of [`DEBUG_DIR`] for raw X API responses.
pub const X_DEBUG_SUBDIR: &str = "x_downloads";

/// The default output file for the tabular feed.
pub const DEFAULT_OUTPUT_FILE: &str = "events.geojson";

/// The default public Nominatim endpoint.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
