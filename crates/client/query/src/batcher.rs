use crate::query::Query;
use crate::transport::{SubscriptionMethods, SubscriptionStream, Transport};
use crate::{NetworkId, QueryError};
use cs_storage::StorageAddress;
use futures::future;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Collapses N queries against M networks into exactly M remote operations,
/// then attributes each piece of the combined response back to the query that
/// asked for it by exact address match.
///
/// A batcher is built per call site: construct it, call [`fetch`] once, or
/// keep it alive for the duration of one [`subscribe`] registration.
///
/// [`fetch`]: QueryBatcher::fetch
/// [`subscribe`]: QueryBatcher::subscribe
pub struct QueryBatcher<T> {
    transport: Arc<dyn Transport>,
    queries: Vec<Query<T>>,
}

impl<T> QueryBatcher<T> {
    pub fn new(transport: Arc<dyn Transport>, queries: Vec<Query<T>>) -> Self {
        Self { transport, queries }
    }

    /// One-shot fetch: issues one `method` call per network, all networks
    /// concurrently, and returns the decoded values flattened in group order
    /// (within a network, query order is preserved).
    ///
    /// A transport failure on any network fails the whole fetch. Callers who
    /// want partial success issue separate batches per network.
    pub async fn fetch(&self, method: &str) -> Result<Vec<T>, QueryError> {
        let groups = group_by_network(&self.queries);

        let fetches = groups.iter().map(|(network, queries)| {
            let transport = self.transport.clone();
            async move {
                let params = vec![serde_json::json!(addresses_hex(queries))];
                let response = transport.send(network, method, params).await?;
                match response.get(0) {
                    Some(change_set) => demultiplex(network, queries, change_set),
                    None => {
                        tracing::warn!(%network, "Storage query response is not a non-empty array");
                        Ok(Vec::new())
                    }
                }
            }
        });

        let per_network = future::try_join_all(fetches).await?;
        Ok(per_network.into_iter().flatten().collect())
    }
}

impl<T: Send + 'static> QueryBatcher<T> {
    /// Long-lived variant of [`fetch`]: registers one push subscription per
    /// network and spawns a task per network that demultiplexes each incoming
    /// notification independently and hands the decoded values to `callback`.
    ///
    /// Errors are isolated per network: a failed registration or a transport
    /// error on one network's stream is reported through the callback for that
    /// network and leaves the siblings running.
    ///
    /// [`fetch`]: QueryBatcher::fetch
    pub async fn subscribe<F>(
        &self,
        callback: F,
        timeout: Option<Duration>,
        methods: SubscriptionMethods,
    ) -> SubscriptionHandle
    where
        F: Fn(&NetworkId, Result<Vec<T>, QueryError>) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let token = CancellationToken::new();

        let registrations = future::join_all(group_by_network(&self.queries).into_iter().map(
            |(network, queries)| {
                let transport = self.transport.clone();
                let methods = methods.clone();
                async move {
                    let params = vec![serde_json::json!(addresses_hex(&queries))];
                    let stream = transport.subscribe(&network, &methods, params, timeout).await;
                    (network, queries, stream)
                }
            },
        ))
        .await;

        let mut tasks = Vec::new();
        for (network, queries, stream) in registrations {
            match stream {
                Ok(stream) => {
                    tasks.push(tokio::spawn(run_subscription(
                        network,
                        queries,
                        stream,
                        callback.clone(),
                        token.child_token(),
                    )));
                }
                Err(err) => {
                    tracing::warn!(%network, %err, "Subscription registration failed");
                    callback(&network, Err(err.into()));
                }
            }
        }

        SubscriptionHandle { token, tasks }
    }
}

/// Consumes one network's notification stream until it ends or the handle is
/// cancelled. Each notification is demultiplexed on its own; an error item is
/// reported for that event only.
async fn run_subscription<T, F>(
    network: NetworkId,
    queries: Vec<Query<T>>,
    mut stream: SubscriptionStream,
    callback: Arc<F>,
    token: CancellationToken,
) where
    F: Fn(&NetworkId, Result<Vec<T>, QueryError>) + Send + Sync + 'static,
{
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            next = stream.next() => match next {
                None => break,
                Some(Err(err)) => callback(&network, Err(err.into())),
                Some(Ok(notification)) => {
                    callback(&network, demultiplex(&network, &queries, &notification));
                }
            },
        }
    }
    // Dropping the stream is what tears the remote subscription down.
}

/// Handle tearing down every per-network subscription of one batch.
pub struct SubscriptionHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SubscriptionHandle {
    /// Schedules teardown of every still-active per-network subscription.
    /// Fire-and-forget: does not wait for confirmation. Calling it again is a
    /// no-op.
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    /// [`unsubscribe`] and wait for every per-network task to exit.
    ///
    /// [`unsubscribe`]: SubscriptionHandle::unsubscribe
    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Partitions queries by network: first-seen network order, query order
/// preserved within each network.
fn group_by_network<T>(queries: &[Query<T>]) -> Vec<(NetworkId, Vec<Query<T>>)> {
    let mut groups: Vec<(NetworkId, Vec<Query<T>>)> = Vec::new();
    for query in queries {
        match groups.iter_mut().find(|(network, _)| *network == *query.network()) {
            Some((_, group)) => group.push(query.clone()),
            None => groups.push((query.network().clone(), vec![query.clone()])),
        }
    }
    groups
}

fn addresses_hex<T>(queries: &[Query<T>]) -> Vec<String> {
    queries.iter().map(|query| query.address().to_hex()).collect()
}

/// Routes one change set back to the queries that asked for its entries.
///
/// Shape problems are recovered locally: entries that are not a
/// `[hexKey, hexValueOrNull]` pair, and entries whose address matches no query
/// in the group, are skipped with a diagnostic. A decode failure for a matched
/// query is a real error and propagates. When the same address is requested by
/// several queries, its entry is handed to each of them, in query order.
fn demultiplex<T>(
    network: &NetworkId,
    queries: &[Query<T>],
    change_set: &serde_json::Value,
) -> Result<Vec<T>, QueryError> {
    let Some(changes) = change_set.get("changes").and_then(|changes| changes.as_array()) else {
        tracing::warn!(%network, "Response change set carries no changes array");
        return Ok(Vec::new());
    };

    let mut entries: Vec<(StorageAddress, Option<Vec<u8>>)> = Vec::with_capacity(changes.len());
    for change in changes {
        let Some(key) = change.get(0).and_then(|key| key.as_str()) else {
            tracing::warn!(%network, %change, "Skipping change entry with a non-string key");
            continue;
        };
        let address = match StorageAddress::from_hex(key) {
            Ok(address) => address,
            Err(err) => {
                tracing::warn!(%network, key, %err, "Skipping change entry with a malformed key");
                continue;
            }
        };
        let value = match change.get(1) {
            Some(serde_json::Value::String(hex_value)) => {
                match hex::decode(hex_value.strip_prefix("0x").unwrap_or(hex_value)) {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        tracing::warn!(%network, key, %err, "Skipping change entry with an invalid hex value");
                        continue;
                    }
                }
            }
            Some(serde_json::Value::Null) => None,
            _ => {
                tracing::warn!(%network, key, "Skipping change entry with a non-string, non-null value");
                continue;
            }
        };
        entries.push((address, value));
    }

    // Stale or unrequested entries must not abort the rest of the batch.
    for (address, _) in &entries {
        if !queries.iter().any(|query| query.address() == address) {
            tracing::warn!(%network, %address, "No query matches response entry");
        }
    }

    let mut decoded = Vec::new();
    for query in queries {
        for (address, value) in &entries {
            if address == query.address() {
                decoded.push(query.decode(value.as_deref())?);
            }
        }
    }
    Ok(decoded)
}
