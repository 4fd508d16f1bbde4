//! Enrichment adapters for journey stops.
//!
//! Every remote lookup goes through [`http::HttpClient`] so the adapters can
//! be driven by scripted responses in tests. Statistics and geometry lookups
//! own a [`coalesce::CoalescingCache`]; nothing here is global.

pub mod coalesce;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod geolocation;
pub mod geometry;
pub mod http;
pub mod model;
pub mod search;
pub mod statistics;

pub use coalesce::*;
pub use config::*;
pub use error::*;
pub use geocoding::*;
pub use geolocation::*;
pub use geometry::*;
pub use http::*;
pub use model::*;
pub use search::*;
pub use statistics::*;
