//! Shared plumbing for the registry crates: logging setup, common response
//! types and startup environment checks.

pub mod types;
pub mod utils;
pub mod env;
