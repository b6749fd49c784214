//! # Amplify Common Library
//!
//! Shared code for the Amplify services:
//! - Error taxonomy (`Error` enum) used by every engine component
//! - Configuration loading (TOML bootstrap file)
//! - Data folder resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
