//! Session controller: one journey, the display settings around it and the
//! enrichment services that fill in its stops.

pub mod enrichment;
pub mod hydration;
pub mod planner;
pub mod view;

pub use enrichment::*;
pub use hydration::*;
pub use planner::*;
pub use view::*;
