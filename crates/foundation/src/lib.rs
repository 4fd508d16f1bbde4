pub mod bounds;
pub mod keys;
pub mod labels;
pub mod math;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use keys::*;
pub use labels::*;
pub use math::*;
