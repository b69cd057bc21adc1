use crate::{ClientConfig, Connection};
use tenacio::{CallDescriptor, RetryDecision, RetryPlan, RpcFailure, Transport};
use tokio::sync::Mutex;

/// Hands out connections to one server, keeping the last good one cached.
pub struct WsTransport {
    config: ClientConfig,
    cached: Mutex<Option<Connection>>,
}

impl WsTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            cached: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether a cached connection exists and is still open.
    pub async fn is_connected(&self) -> bool {
        self.cached
            .lock()
            .await
            .as_ref()
            .is_some_and(Connection::is_open)
    }
}

#[async_trait::async_trait]
impl Transport for WsTransport {
    type Delegate = Connection;

    async fn acquire_delegate(&self, allow_cached: bool) -> Result<Connection, RpcFailure> {
        // Held across the connect so concurrent callers share one new
        // connection instead of racing to open several.
        let mut cached = self.cached.lock().await;

        if allow_cached {
            if let Some(connection) = cached.as_ref().filter(|c| c.is_open()) {
                return Ok(connection.clone());
            }
        }

        tracing::debug!(url = %self.config.url, "connecting");
        let connection = Connection::connect(&self.config.url, self.config.connect_timeout).await?;
        *cached = Some(connection.clone());
        Ok(connection)
    }

    async fn retry_policy(
        &self,
        retry_count: u32,
        failure: &RpcFailure,
        call: &CallDescriptor,
    ) -> RetryDecision {
        let plan = self.config.retry_intervals.decide(retry_count, failure, call);
        if let RetryPlan::Retry { after } = plan {
            if !after.is_zero() {
                tracing::debug!(delay_ms = after.as_millis() as u64, "waiting before retry");
                tokio::time::sleep(after).await;
            }
        }
        plan.decision()
    }

    /// Stops handing `delegate` out to new calls.
    ///
    /// After a timeout a connection that is still open is only evicted. Calls
    /// in flight on it keep their replies and the socket closes once the last
    /// of them drops it. Any other failure closes it right away.
    fn discard_delegate(&self, delegate: Connection, failure: &RpcFailure) {
        if matches!(failure, RpcFailure::Timeout { .. }) && delegate.is_open() {
            tracing::debug!("retiring connection after {}", failure);
        } else {
            tracing::debug!("closing connection after {}", failure);
            delegate.close();
        }
        if let Ok(mut cached) = self.cached.try_lock() {
            if cached.as_ref().is_some_and(|c| c.same_as(&delegate)) {
                *cached = None;
            }
        }
    }
}
