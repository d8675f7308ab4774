//! Veritas Protocol: the messages exchanged between the page, background
//! and popup contexts, and the ports they travel over.
//!
//! Contexts share no memory. Each one owns an [`Inbox`]; everybody else
//! holds a cloneable [`Port`] and gets exactly one reply per request.

pub mod message;
pub mod port;

pub use message::{AnalyzeReply, Message, PageReply, Reply};
pub use port::{channel, Envelope, Inbox, Port, Responder};
