//! # MoodReads Common Library
//!
//! Shared code for the MoodReads crates:
//! - Error type and result alias
//! - TOML bootstrap configuration
//! - Root folder and credential resolution
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
