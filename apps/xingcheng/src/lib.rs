//! # Xingcheng Library
//!
//! This library exposes the Xingcheng app modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod api;
pub mod cli;
pub mod config;

// Re-export xingcheng_core for convenience
pub use xingcheng_core;
