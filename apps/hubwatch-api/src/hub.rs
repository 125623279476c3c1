//! # Hub Gateway
//!
//! The narrow capability the use-cases need from the push hub:
//! `subscribe(channel_id)` and `unsubscribe(channel_id)`.
//!
//! ## WebSub Handshake
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  hubwatch                                  Hub                          │
//! │     │  POST hub.mode=subscribe                │                         │
//! │     │       hub.topic=<feed url>              │                         │
//! │     │       hub.callback=<public>/callback    │                         │
//! │     │       hub.lease_seconds=86400           │                         │
//! │     │       hub.verify=async                  │                         │
//! │     │────────────────────────────────────────►│                         │
//! │     │◄──────────────────── 202 Accepted ──────│                         │
//! │     │                                         │                         │
//! │     │◄── GET /callback?hub.challenge=xyz ─────│  (verification)         │
//! │     │──────────────────────── 200 "xyz" ─────►│                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any 2xx counts as success. Timeouts surface as [`HubError::Timeout`]
//! rather than hanging the caller.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use hubwatch_core::FeedUrls;

// =============================================================================
// Contract
// =============================================================================

/// Hub acknowledgment, kept on the record for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubAck {
    pub status: u16,
    pub message: String,
}

impl HubAck {
    pub fn accepted() -> Self {
        HubAck {
            status: 202,
            message: "202 Accepted".to_string(),
        }
    }
}

/// Hub gateway failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HubError {
    #[error("hub did not answer within {0}s")]
    Timeout(u64),

    #[error("hub transport error: {0}")]
    Transport(String),

    #[error("hub rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid hub URL: {0}")]
    InvalidUrl(String),
}

/// Subscribe/unsubscribe capability.
#[async_trait]
pub trait HubGateway: Send + Sync {
    async fn subscribe(&self, channel_id: &str) -> Result<HubAck, HubError>;

    async fn unsubscribe(&self, channel_id: &str) -> Result<HubAck, HubError>;
}

// =============================================================================
// WebSub Client
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum HubMode {
    Subscribe,
    Unsubscribe,
}

impl HubMode {
    fn as_str(&self) -> &'static str {
        match self {
            HubMode::Subscribe => "subscribe",
            HubMode::Unsubscribe => "unsubscribe",
        }
    }
}

/// [`HubGateway`] speaking the PubSubHubbub/WebSub form protocol.
#[derive(Debug, Clone)]
pub struct WebSubHubClient {
    client: reqwest::Client,
    hub_url: String,
    urls: FeedUrls,
    lease_seconds: i64,
    timeout: Duration,
}

impl WebSubHubClient {
    pub fn new(
        hub_url: impl Into<String>,
        urls: FeedUrls,
        lease_seconds: i64,
        timeout: Duration,
    ) -> Result<Self, HubError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::Transport(e.to_string()))?;

        Ok(WebSubHubClient {
            client,
            hub_url: hub_url.into(),
            urls,
            lease_seconds,
            timeout,
        })
    }

    fn form(&self, mode: HubMode, channel_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("hub.mode", mode.as_str().to_string()),
            ("hub.topic", self.urls.topic_url(channel_id)),
            ("hub.callback", self.urls.callback_url()),
            ("hub.verify", "async".to_string()),
            ("hub.lease_seconds", self.lease_seconds.to_string()),
        ]
    }

    async fn send(&self, mode: HubMode, channel_id: &str) -> Result<HubAck, HubError> {
        debug!(channel_id = %channel_id, mode = mode.as_str(), hub = %self.hub_url, "Sending hub request");

        let response = self
            .client
            .post(&self.hub_url)
            .form(&self.form(mode, channel_id))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(channel_id = %channel_id, status = status.as_u16(), error = %e, "Failed to read hub response body");
                String::new()
            }
        };

        if status.is_success() {
            let reason = status.canonical_reason().unwrap_or("OK");
            let message = if body.trim().is_empty() {
                format!("{} {}", status.as_u16(), reason)
            } else {
                body.trim().to_string()
            };
            Ok(HubAck {
                status: status.as_u16(),
                message,
            })
        } else {
            warn!(channel_id = %channel_id, status = status.as_u16(), "Hub rejected request");
            Err(HubError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn classify(&self, err: reqwest::Error) -> HubError {
        if err.is_timeout() {
            HubError::Timeout(self.timeout.as_secs())
        } else if err.is_builder() {
            HubError::InvalidUrl(err.to_string())
        } else {
            HubError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl HubGateway for WebSubHubClient {
    async fn subscribe(&self, channel_id: &str) -> Result<HubAck, HubError> {
        self.send(HubMode::Subscribe, channel_id).await
    }

    async fn unsubscribe(&self, channel_id: &str) -> Result<HubAck, HubError> {
        self.send(HubMode::Unsubscribe, channel_id).await
    }
}

// =============================================================================
// Scripted Hub (test double)
// =============================================================================

/// Scripted response for [`ScriptedHub`].
#[derive(Debug, Clone)]
pub enum HubScript {
    Accept,
    Fail(HubError),
    /// Never answers; exercises the caller's timeout.
    Hang,
}

#[derive(Debug, Default)]
struct ScriptState {
    queue: VecDeque<HubScript>,
    fallback: Option<HubScript>,
    calls: Vec<(String, String)>,
}

/// In-memory [`HubGateway`] that records calls and replays scripted outcomes.
///
/// Queued outcomes are consumed first; afterwards the fallback (default
/// `Accept`) answers every call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHub {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one outcome.
    pub fn push(&self, script: HubScript) -> &Self {
        self.lock().queue.push_back(script);
        self
    }

    /// Sets the outcome used once the queue is empty.
    pub fn always(&self, script: HubScript) -> &Self {
        self.lock().fallback = Some(script);
        self
    }

    /// All calls so far as `(mode, channel_id)`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn answer(&self, mode: &str, channel_id: &str) -> Result<HubAck, HubError> {
        let script = {
            let mut state = self.lock();
            state.calls.push((mode.to_string(), channel_id.to_string()));
            state
                .queue
                .pop_front()
                .or_else(|| state.fallback.clone())
                .unwrap_or(HubScript::Accept)
        };

        match script {
            HubScript::Accept => Ok(HubAck::accepted()),
            HubScript::Fail(err) => Err(err),
            HubScript::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl HubGateway for ScriptedHub {
    async fn subscribe(&self, channel_id: &str) -> Result<HubAck, HubError> {
        self.answer("subscribe", channel_id).await
    }

    async fn unsubscribe(&self, channel_id: &str) -> Result<HubAck, HubError> {
        self.answer("unsubscribe", channel_id).await
    }
}
