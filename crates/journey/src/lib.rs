pub mod comparison;
pub mod journey;
pub mod point;
pub mod segments;

pub use comparison::*;
pub use journey::*;
pub use point::*;
pub use segments::*;
