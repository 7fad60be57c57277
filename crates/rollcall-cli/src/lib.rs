//! rollcall-cli library root.
//!
//! Config loading and terminal prompts, exposed so integration tests can
//! exercise them without a live directory.

pub mod config;
pub mod prompt;
