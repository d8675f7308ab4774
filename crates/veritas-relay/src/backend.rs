//! Analysis backend seam.

use std::future::Future;

use veritas_core::{AnalysisResult, PageSnapshot, Result};

/// Something that can turn a snapshot into an analysis.
///
/// Implementations make exactly one attempt per call. Every failure,
/// whatever its cause, comes back as a [`veritas_core::Error`] whose
/// display text is shown to the user.
pub trait AnalysisBackend: Send + Sync + 'static {
    fn analyze(
        &self,
        endpoint: &str,
        snapshot: &PageSnapshot,
    ) -> impl Future<Output = Result<AnalysisResult>> + Send;
}
