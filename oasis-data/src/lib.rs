//! Paired brain MRI volume datasets for deformable registration.
//!
//! Each record pairs an anchor subject selected by index with a companion
//! subject drawn at random from the rest of the pool.

mod common;
pub mod config;
pub mod dataset;
pub mod processor;
pub mod profiling;
pub mod utils;
