//! Volume loading and preprocessing building blocks.

mod loader;
mod transform;

pub use loader::*;
pub use transform::*;
