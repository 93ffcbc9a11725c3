//! ffbatch core - batch media transform pipeline.
//!
//! This crate contains all pipeline logic with zero UI dependencies.
//! A front end collects a folder and per-mode parameters, starts a
//! [`batch::BatchSession`], and polls the log feed and progress snapshot
//! until the worker finishes.

pub mod batch;
pub mod command;
pub mod config;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod probe;
pub mod process;

#[cfg(test)]
pub(crate) mod testing;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
