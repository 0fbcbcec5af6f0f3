//! Core type definitions used across the engagement workspace.

pub mod flavour;

pub use flavour::Flavour;
