//! Background context actor.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use veritas_core::{AnalysisResult, ConfigStore, ExtensionConfig, PageSnapshot, Result};
use veritas_protocol::{channel, AnalyzeReply, Inbox, Message, Port, Reply};

use crate::backend::AnalysisBackend;

/// Install hook: seed the config with the default service URL.
///
/// Runs once, when the extension is first installed; never per request.
pub fn on_installed(store: &ConfigStore) -> Result<()> {
    store.seed_defaults()
}

/// Forwards snapshots to the analysis service.
///
/// The configuration arrives as a `watch` receiver at construction and is
/// read once per request, before anything is sent.
pub struct Relay<B> {
    backend: Arc<B>,
    config: watch::Receiver<ExtensionConfig>,
}

impl<B> Clone for Relay<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            config: self.config.clone(),
        }
    }
}

impl<B: AnalysisBackend> Relay<B> {
    pub fn new(backend: B, config: watch::Receiver<ExtensionConfig>) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
        }
    }

    /// Analyze one snapshot. One attempt; any failure is final.
    pub async fn analyze(&self, snapshot: &PageSnapshot) -> Result<AnalysisResult> {
        let endpoint = self.config.borrow().analyze_endpoint();
        let result = self.backend.analyze(&endpoint, snapshot).await;
        match &result {
            Ok(analysis) => info!(
                "Analyzed {}: {} ({} claims)",
                snapshot.url,
                analysis.verdict.label,
                analysis.claims.len()
            ),
            Err(e) => warn!("Analysis of {} failed: {}", snapshot.url, e),
        }
        result
    }

    /// Start the background context. Each `ANALYZE_PAGE` runs in its own
    /// task, so requests never wait on each other.
    pub fn spawn(self) -> RelayHandle {
        let (port, inbox) = channel("background");
        let task = tokio::spawn(run(inbox, self));
        info!("Background context started");
        RelayHandle { port, task }
    }
}

/// Handle to a running background context.
pub struct RelayHandle {
    port: Port,
    task: JoinHandle<()>,
}

impl RelayHandle {
    pub fn port(&self) -> Port {
        self.port.clone()
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

async fn run<B: AnalysisBackend>(mut inbox: Inbox, relay: Relay<B>) {
    while let Some(envelope) = inbox.recv().await {
        let (message, responder) = envelope.into_parts();
        match message {
            Message::AnalyzePage(snapshot) => {
                let relay = relay.clone();
                tokio::spawn(async move {
                    let reply = match relay.analyze(&snapshot).await {
                        Ok(data) => AnalyzeReply::success(data),
                        Err(e) => AnalyzeReply::failure(e),
                    };
                    responder.send(Reply::Analyze(reply));
                });
            }
            other => {
                debug!("{} context ignores {}", inbox.name(), other.kind());
            }
        }
    }
    info!("Background context stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use veritas_core::{Error, Verdict, DEFAULT_API_BASE};

    struct Recorder {
        endpoints: Mutex<Vec<String>>,
        fail_with: Option<u16>,
        delay: Duration,
    }

    impl Recorder {
        fn ok() -> Self {
            Self {
                endpoints: Mutex::new(Vec::new()),
                fail_with: None,
                delay: Duration::ZERO,
            }
        }
    }

    impl AnalysisBackend for Arc<Recorder> {
        async fn analyze(&self, endpoint: &str, snapshot: &PageSnapshot) -> Result<AnalysisResult> {
            self.endpoints.lock().unwrap().push(endpoint.to_string());
            tokio::time::sleep(self.delay).await;
            if let Some(status) = self.fail_with {
                return Err(Error::Backend(status));
            }
            // Echo the title back so callers can check pairing.
            Ok(AnalysisResult {
                verdict: Verdict {
                    label: snapshot.title.clone(),
                    score: 0.5,
                },
                claims: vec![],
            })
        }
    }

    fn snapshot(title: &str) -> PageSnapshot {
        PageSnapshot {
            url: "https://ex.com".into(),
            title: title.into(),
            text: "a".repeat(200),
        }
    }

    #[tokio::test]
    async fn test_unset_config_uses_default_base() {
        let recorder = Arc::new(Recorder::ok());
        let store = ConfigStore::in_memory(ExtensionConfig::default());
        let relay = Relay::new(recorder.clone(), store.subscribe());

        relay.analyze(&snapshot("T")).await.unwrap();
        let endpoints = recorder.endpoints.lock().unwrap().clone();
        assert_eq!(endpoints, vec![format!("{}/analyze_text", DEFAULT_API_BASE)]);
    }

    #[tokio::test]
    async fn test_config_change_seen_by_next_request() {
        let recorder = Arc::new(Recorder::ok());
        let store = ConfigStore::in_memory(ExtensionConfig::default());
        let relay = Relay::new(recorder.clone(), store.subscribe());

        relay.analyze(&snapshot("T")).await.unwrap();
        store.set_api_base("https://veritas.example").unwrap();
        relay.analyze(&snapshot("T")).await.unwrap();

        let endpoints = recorder.endpoints.lock().unwrap().clone();
        assert_eq!(endpoints[1], "https://veritas.example/analyze_text");
    }

    #[tokio::test]
    async fn test_install_hook_seeds_default() {
        let store = ConfigStore::in_memory(ExtensionConfig {
            api_base: Some("https://old.example".into()),
        });
        on_installed(&store).unwrap();
        assert_eq!(store.current(), ExtensionConfig::installed());
    }

    #[tokio::test]
    async fn test_failure_reply() {
        let recorder = Arc::new(Recorder {
            fail_with: Some(500),
            ..Recorder::ok()
        });
        let store = ConfigStore::in_memory(ExtensionConfig::default());
        let handle = Relay::new(recorder.clone(), store.subscribe()).spawn();

        let reply = handle
            .port()
            .request(Message::AnalyzePage(snapshot("T")))
            .await
            .unwrap();
        let Reply::Analyze(reply) = reply else {
            panic!("expected analyze reply");
        };
        assert!(!reply.ok);
        assert_eq!(reply.into_result().unwrap_err(), "Backend error 500");
        assert_eq!(recorder.endpoints.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_independent() {
        let recorder = Arc::new(Recorder {
            delay: Duration::from_millis(50),
            ..Recorder::ok()
        });
        let store = ConfigStore::in_memory(ExtensionConfig::default());
        let handle = Relay::new(recorder.clone(), store.subscribe()).spawn();
        let port = handle.port();

        let requests = (0..5).map(|i| {
            let port = port.clone();
            async move {
                port.request(Message::AnalyzePage(snapshot(&format!("page-{}", i))))
                    .await
            }
        });
        let replies = futures::future::join_all(requests).await;

        for (i, reply) in replies.into_iter().enumerate() {
            let Ok(Reply::Analyze(reply)) = reply else {
                panic!("expected analyze reply");
            };
            assert_eq!(reply.into_result().unwrap().verdict.label, format!("page-{}", i));
        }
        assert_eq!(recorder.endpoints.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_get_page_ignored() {
        let store = ConfigStore::in_memory(ExtensionConfig::default());
        let handle = Relay::new(Arc::new(Recorder::ok()), store.subscribe()).spawn();
        let err = handle.port().request(Message::GetPage).await.unwrap_err();
        assert!(matches!(err, Error::NoResponse("background")));
    }
}
