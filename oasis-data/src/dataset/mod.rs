//! Paired volume datasets.

mod dataset_;
mod paired;
mod paired_seg;
mod pool;
mod record;
mod streaming;

pub use dataset_::*;
pub use paired::*;
pub use paired_seg::*;
pub use pool::*;
pub use record::*;
pub use streaming::*;
