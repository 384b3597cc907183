use futures::stream::BoxStream;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Identifier of one network connection, the unit queries are grouped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NetworkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One-shot RPC method reading a set of storage cells at the current head.
pub const QUERY_STORAGE_AT: &str = "state_queryStorageAt";

/// RPC method names of one push subscription registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionMethods {
    pub subscribe: String,
    pub notification: String,
    pub unsubscribe: String,
}

impl Default for SubscriptionMethods {
    /// The storage change subscription triple.
    fn default() -> Self {
        Self {
            subscribe: "state_subscribeStorage".to_string(),
            notification: "state_storage".to_string(),
            unsubscribe: "state_unsubscribeStorage".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("RPC request failed: {0}")]
    Request(String),

    #[error("Connection to network lost: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Subscription closed by remote")]
    SubscriptionClosed,
}

/// Push notifications of one per-network subscription, in that network's
/// delivery order. Dropping the stream is the transport's cue to issue the
/// unsubscribe call it was handed the method name for at registration.
pub type SubscriptionStream = BoxStream<'static, Result<serde_json::Value, TransportError>>;

/// Remote call surface of one multiplexed connection pool.
///
/// Implementations own retries, reconnection and request routing; this crate
/// only ever issues one `send` or one `subscribe` per network per batch.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// One-shot remote call. For the state-reading methods used here the
    /// response is an array whose first element carries a `changes` field.
    async fn send(
        &self,
        network: &NetworkId,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, TransportError>;

    /// Registers a push subscription and returns its notification stream.
    async fn subscribe(
        &self,
        network: &NetworkId,
        methods: &SubscriptionMethods,
        params: Vec<serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<SubscriptionStream, TransportError>;
}
