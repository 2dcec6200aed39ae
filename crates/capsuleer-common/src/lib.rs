//! Core shared types, errors, traits, and logging utilities for Capsuleer
//!
//! This crate provides the common plumbing used by all Capsuleer
//! components: the error marker trait, configuration loading contract,
//! and the unified logging initialization.

pub mod config;
pub mod error;
pub mod logging;

pub use config::ConfigLoader;
pub use error::{CapsuleerError, ConfigurationError};
