//! # engagement-core
//!
//! Core crate for the engagement service. Contains configuration schemas,
//! the feed flavour type, text helpers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other engagement crates.

pub mod config;
pub mod error;
pub mod result;
pub mod text;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
pub use types::Flavour;
