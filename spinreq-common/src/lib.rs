//! # SpinReq Common Library
//!
//! Shared code for SpinReq services including:
//! - Database schema initialization and row models
//! - Error types
//! - Configuration and data folder resolution
//! - Track string normalization used by all rule matching
//! - Time utilities

pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
pub mod time;

pub use error::{Error, Result};
pub use normalize::normalize_track_string;
