//! Configuration values for the table viewer.
//!
//! A [`Configuration`] is opaque JSON at this layer: the rendering engine owns its schema.
//! This crate only guarantees acceptability (the text parsed) and keeps the raw text and
//! [`ConfigOrigin`] around for error reporting.

mod configuration;
mod error;

pub use configuration::{ConfigOrigin, Configuration};
pub use error::{Error, excerpt_at};

/// Query parameter naming a remote configuration URL.
pub const CONFIG_QUERY_PARAM: &str = "config";
