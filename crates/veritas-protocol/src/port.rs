//! Ports and inboxes: the only way one context reaches another.
//!
//! A request carries its own `oneshot` reply channel, so correlation is
//! structural: whoever holds the [`Responder`] answers exactly one caller.
//! Dropping a responder without answering surfaces as
//! [`Error::NoResponse`] on the caller side instead of a hang.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use uuid::Uuid;
use veritas_core::{Error, Result};

use crate::message::{Message, Reply};

/// A message in flight, paired with the channel its answer goes back on.
pub struct Envelope {
    pub id: Uuid,
    pub message: Message,
    reply: oneshot::Sender<Reply>,
}

impl Envelope {
    /// Split into the message and the handle used to answer it.
    pub fn into_parts(self) -> (Message, Responder) {
        (
            self.message,
            Responder {
                id: self.id,
                tx: self.reply,
            },
        )
    }
}

/// Single-use reply handle.
pub struct Responder {
    id: Uuid,
    tx: oneshot::Sender<Reply>,
}

impl Responder {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Answer the request. A caller that went away is not an error.
    pub fn send(self, reply: Reply) {
        if self.tx.send(reply).is_err() {
            debug!("Requester for {} is gone, reply discarded", self.id);
        }
    }
}

/// Sending side of a context's message channel.
#[derive(Clone)]
pub struct Port {
    name: &'static str,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl Port {
    /// Name of the context behind this port.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the receiving context has shut down.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Send a message and wait for its reply.
    pub async fn request(&self, message: Message) -> Result<Reply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let id = Uuid::new_v4();
        debug!("{} → {} ({})", message.kind(), self.name, id);

        self.tx
            .send(Envelope {
                id,
                message,
                reply: reply_tx,
            })
            .map_err(|_| Error::ContextClosed(self.name))?;

        reply_rx.await.map_err(|_| Error::NoResponse(self.name))
    }

    /// Like [`Port::request`], giving up after `timeout`.
    pub async fn request_with_timeout(&self, message: Message, timeout: Duration) -> Result<Reply> {
        tokio::time::timeout(timeout, self.request(message))
            .await
            .map_err(|_| Error::Timeout(self.name))?
    }
}

/// Receiving side of a context's message channel.
pub struct Inbox {
    name: &'static str,
    rx: mpsc::UnboundedReceiver<Envelope>,
}

impl Inbox {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Next envelope, or `None` once every port is dropped.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}

/// Create the port/inbox pair for a named context.
pub fn channel(name: &'static str) -> (Port, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Port { name, tx }, Inbox { name, rx })
}
