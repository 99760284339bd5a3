//! Fetch-then-extract glue for one run.

pub mod runner;

pub use runner::{run, Pipeline};
