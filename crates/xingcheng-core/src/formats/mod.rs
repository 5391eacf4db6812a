//! # Formats Module
//!
//! Save blob encodings.
//!
//! This module contains:
//! - JSON save blob (the browser local-storage shape)
//! - Canonical binary export (postcard + header)
//!
//! Note: File I/O lives in `storage` and the app layer. This module only
//! handles format conversion (pure transformations).

mod persistence;

pub use persistence::*;
