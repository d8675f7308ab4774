//! Message envelope and reply shapes.

use serde::{Deserialize, Serialize};
use veritas_core::{AnalysisResult, PageSnapshot};

/// Every message that crosses a context boundary.
///
/// Serialized as `{"type": "...", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Popup → page: read the current document.
    GetPage,
    /// Popup → background: send the snapshot to the analysis service.
    AnalyzePage(PageSnapshot),
}

impl Message {
    /// Wire discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetPage => "GET_PAGE",
            Self::AnalyzePage(_) => "ANALYZE_PAGE",
        }
    }
}

/// Reply to `GET_PAGE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PageSnapshot>,
}

impl PageReply {
    pub fn snapshot(snapshot: PageSnapshot) -> Self {
        Self {
            ok: true,
            payload: Some(snapshot),
        }
    }
}

/// Reply to `ANALYZE_PAGE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeReply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeReply {
    pub fn success(data: AnalysisResult) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    /// Collapse into the result the popup renders. A failure without a
    /// reason reports `unknown`.
    pub fn into_result(self) -> Result<AnalysisResult, String> {
        match (self.ok, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error.unwrap_or_else(|| "unknown".into())),
        }
    }
}

/// Any reply a context can send back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Page(PageReply),
    Analyze(AnalyzeReply),
}
