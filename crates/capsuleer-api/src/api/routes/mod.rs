//! Route handlers for the Capsuleer API

pub mod auth;
pub mod health;
