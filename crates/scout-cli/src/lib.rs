//! Scout CLI
//!
//! Hosts probe sessions from the command line:
//! - `probe`: run a batch of seeds from a JSON file over HTTP `HEAD`
//! - `candidates`: dry-run candidate generation for one code
//! - `conventions`: list the naming conventions in effect

#![allow(missing_docs)]

pub mod cli;
pub mod http;
pub mod render;

pub use http::{outcome_for_status, HttpExists};
