//! Background relay: the only context with network access.
//!
//! Receives `ANALYZE_PAGE` from the popup, posts the snapshot to
//! `{apiBase}/analyze_text` through an [`AnalysisBackend`], and replies with
//! the parsed result or a single failure message. No retries.

pub mod backend;
pub mod http;
pub mod relay;

pub use backend::AnalysisBackend;
pub use http::HttpBackend;
pub use relay::{on_installed, Relay, RelayHandle};
