use std::time::Duration;

/// Connection liveness settings for [`RpcServer`](crate::RpcServer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// How often the server pings each client.
    pub heartbeat_interval: Duration,
    /// How long a client may stay silent (pongs included) before it is
    /// disconnected.
    pub client_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(15),
        }
    }
}
