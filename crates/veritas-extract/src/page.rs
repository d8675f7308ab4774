//! Page context actor.
//!
//! Owns the extractor and a view of the live document. The host (the
//! browser, or the CLI standing in for it) swaps documents through
//! [`PageContext::navigate`]; the popup only ever talks to the port.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use veritas_protocol::{channel, Inbox, Message, PageReply, Port, Reply};

use crate::extractor::Extractor;
use crate::style::StyleProbe;

/// The document currently loaded in the tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDocument {
    pub url: String,
    pub html: String,
}

impl PageDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Handle to a running page context.
pub struct PageContext {
    port: Port,
    document: watch::Sender<PageDocument>,
    task: JoinHandle<()>,
}

impl PageContext {
    /// Start the page context for `document`. A snapshot is computed
    /// immediately so the cache is warm before the first request.
    pub fn spawn(document: PageDocument, probe: Arc<dyn StyleProbe>) -> Self {
        let (port, inbox) = channel("page");
        let (doc_tx, doc_rx) = watch::channel(document);

        let mut extractor = Extractor::new(probe);
        let initial = doc_rx.borrow().clone();
        extractor.refresh(&initial);
        info!("Page context started for {}", initial.url);

        let task = tokio::spawn(run(inbox, extractor, doc_rx));
        Self {
            port,
            document: doc_tx,
            task,
        }
    }

    /// Port for sending messages into this page.
    pub fn port(&self) -> Port {
        self.port.clone()
    }

    /// Replace the loaded document. Later requests read the new one.
    pub fn navigate(&self, document: PageDocument) {
        info!("Page navigated to {}", document.url);
        self.document.send_replace(document);
    }

    /// Tear the page down; pending requests see the context as closed.
    pub fn close(self) {
        self.task.abort();
    }
}

async fn run(mut inbox: Inbox, mut extractor: Extractor, document: watch::Receiver<PageDocument>) {
    while let Some(envelope) = inbox.recv().await {
        let (message, responder) = envelope.into_parts();
        match message {
            Message::GetPage => {
                let current = document.borrow().clone();
                let snapshot = extractor.refresh(&current);
                responder.send(Reply::Page(PageReply::snapshot(snapshot)));
            }
            other => {
                debug!("{} context ignores {}", inbox.name(), other.kind());
            }
        }
    }
    debug!("Page context inbox closed");
}
