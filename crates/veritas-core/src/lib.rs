//! Veritas Core: the data model, configuration and error type shared by
//! every context.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigStore, ExtensionConfig, ANALYZE_PATH, DEFAULT_API_BASE};
pub use error::{Error, Result};
pub use types::*;
