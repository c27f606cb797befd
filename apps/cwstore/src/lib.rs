//! # cwstore
//!
//! Command line front end for the cell-complex knowledge store.
//!
//! The binary loads a knowledge file and an optional configuration file,
//! builds an in-memory [`cwstore_core::Complex`] and runs one command
//! against it. The modules are exposed as a library so integration tests
//! can drive the commands without spawning a process.

pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod knowledge;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use knowledge::Knowledge;
