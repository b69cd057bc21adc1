use std::time::Duration;
use tenacio::RetryIntervals;

/// Where to connect and how patiently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the server, e.g. `ws://127.0.0.1:8080/ws`.
    pub url: String,
    pub connect_timeout: Duration,
    /// Upper bound on waiting for one reply. `None` waits as long as the
    /// connection stays up.
    pub invocation_timeout: Option<Duration>,
    pub retry_intervals: RetryIntervals,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            invocation_timeout: None,
            retry_intervals: RetryIntervals::default(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = Some(timeout);
        self
    }

    pub fn with_retry_intervals(mut self, retry_intervals: RetryIntervals) -> Self {
        self.retry_intervals = retry_intervals;
        self
    }
}
