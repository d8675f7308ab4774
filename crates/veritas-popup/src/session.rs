//! Popup session controller.
//!
//! A controller lives exactly as long as the popup. It runs at most one
//! analysis: `Idle → Extracting → (AnalysisWaiting | ExtractionFailed) →
//! (Rendered | AnalysisFailed)`. Triggering it again after it has left
//! `Idle` is rejected; reopening the popup builds a new controller.

use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use veritas_core::{AnalysisResult, Error, PageSnapshot, Result};
use veritas_protocol::{Message, Port, Reply};

use crate::view::{PopupView, STATUS_CONTACTING, STATUS_EXTRACTING, STATUS_NOT_ENOUGH_TEXT};

/// Pages with less text than this are not worth analyzing.
pub const MIN_TEXT_CHARS: usize = 120;

/// Where a session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Extracting,
    AnalysisWaiting,
    ExtractionFailed,
    AnalysisFailed,
    Rendered,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ExtractionFailed | Self::AnalysisFailed | Self::Rendered
        )
    }
}

/// Drives one analysis session for a popup.
pub struct PopupController {
    page: Port,
    background: Port,
    reply_timeout: Option<Duration>,
    state: Mutex<SessionState>,
    view: watch::Sender<PopupView>,
}

impl PopupController {
    pub fn new(page: Port, background: Port) -> Self {
        let (view, _) = watch::channel(PopupView::default());
        Self {
            page,
            background,
            reply_timeout: None,
            state: Mutex::new(SessionState::Idle),
            view,
        }
    }

    /// Give up on a context that has not answered within `timeout`.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Current view.
    pub fn view(&self) -> PopupView {
        self.view.borrow().clone()
    }

    /// Receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<PopupView> {
        self.view.subscribe()
    }

    /// The user's "analyze" action. Returns the terminal state reached, or
    /// [`Error::SessionActive`] if this session already ran.
    pub async fn analyze(&self) -> Result<SessionState> {
        self.begin()?;
        self.publish(PopupView::status(STATUS_EXTRACTING));

        let snapshot = match self.request_snapshot().await {
            Some(snapshot) if snapshot.text.chars().count() >= MIN_TEXT_CHARS => snapshot,
            Some(snapshot) => {
                info!(
                    "Only {} chars of text on {}, not analyzing",
                    snapshot.text.chars().count(),
                    snapshot.url
                );
                return Ok(self.finish(
                    SessionState::ExtractionFailed,
                    PopupView::status(STATUS_NOT_ENOUGH_TEXT),
                ));
            }
            None => {
                return Ok(self.finish(
                    SessionState::ExtractionFailed,
                    PopupView::status(STATUS_NOT_ENOUGH_TEXT),
                ));
            }
        };

        self.transition(SessionState::AnalysisWaiting);
        self.publish(PopupView::status(STATUS_CONTACTING));

        match self.request_analysis(snapshot).await {
            Ok(result) => Ok(self.finish(SessionState::Rendered, PopupView::rendered(&result))),
            Err(reason) => {
                warn!("Analysis failed: {}", reason);
                Ok(self.finish(SessionState::AnalysisFailed, PopupView::failure(&reason)))
            }
        }
    }

    // ---------------------------------------------------------------
    // Cross-context requests
    // ---------------------------------------------------------------

    async fn send(&self, port: &Port, message: Message) -> Result<Reply> {
        match self.reply_timeout {
            Some(timeout) => port.request_with_timeout(message, timeout).await,
            None => port.request(message).await,
        }
    }

    /// Ask the page for a snapshot. Any failure to get one is `None`.
    async fn request_snapshot(&self) -> Option<PageSnapshot> {
        match self.send(&self.page, Message::GetPage).await {
            Ok(Reply::Page(reply)) if reply.ok => reply.payload,
            Ok(other) => {
                debug!("Unexpected reply to GET_PAGE: {:?}", other);
                None
            }
            Err(e) => {
                warn!("No snapshot from page: {}", e);
                None
            }
        }
    }

    /// Ask the relay to analyze. The error string is what the user sees.
    async fn request_analysis(
        &self,
        snapshot: PageSnapshot,
    ) -> std::result::Result<AnalysisResult, String> {
        match self
            .send(&self.background, Message::AnalyzePage(snapshot))
            .await
        {
            Ok(Reply::Analyze(reply)) => reply.into_result(),
            Ok(other) => {
                debug!("Unexpected reply to ANALYZE_PAGE: {:?}", other);
                Err("unknown".into())
            }
            Err(Error::NoResponse(_)) => Err("unknown".into()),
            Err(e) => Err(e.to_string()),
        }
    }

    // ---------------------------------------------------------------
    // State
    // ---------------------------------------------------------------

    fn begin(&self) -> Result<()> {
        let mut state = self.state.lock();
        if *state != SessionState::Idle {
            debug!("Ignoring analyze action in state {:?}", *state);
            return Err(Error::SessionActive);
        }
        *state = SessionState::Extracting;
        Ok(())
    }

    fn transition(&self, next: SessionState) {
        let mut state = self.state.lock();
        debug!("Session {:?} → {:?}", *state, next);
        *state = next;
    }

    fn finish(&self, terminal: SessionState, view: PopupView) -> SessionState {
        self.transition(terminal);
        self.publish(view);
        info!("Session finished: {:?}", terminal);
        terminal
    }

    fn publish(&self, view: PopupView) {
        self.view.send_replace(view);
    }
}
