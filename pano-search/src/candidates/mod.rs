//! Translation and rotation hypotheses for the pose search.

mod bounds;
mod rotation;
mod translation;

pub use bounds::*;
pub use rotation::*;
pub use translation::*;
