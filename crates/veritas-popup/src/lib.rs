//! Popup context: one analysis session per popup lifetime.
//!
//! The controller asks the page for a snapshot, asks the background relay
//! to analyze it, and publishes a [`PopupView`] after every step.

pub mod session;
pub mod view;

pub use session::{PopupController, SessionState, MIN_TEXT_CHARS};
pub use view::{ClaimView, EvidenceLink, PopupView, MAX_EVIDENCE_LINKS};
