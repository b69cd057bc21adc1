use crate::{ClientConfig, WsRemoteService, WsTransport};
use std::sync::Arc;
use tenacio::{
    CallDescriptor, Context, InvokeError, ProxyOptions, ResilientInvoker, RpcFailure, Transport,
};
use tenacio_rpc_service_caller::RpcServiceCallerInterface;

/// A WebSocket RPC client whose calls survive dropped connections.
///
/// Clones made with [`RpcClient::with_proxy_options`] share the same
/// connection cache.
#[derive(Clone)]
pub struct RpcClient {
    invoker: Arc<ResilientInvoker<WsTransport, WsRemoteService>>,
    options: ProxyOptions,
}

impl RpcClient {
    /// Creates a client without connecting. The first call connects.
    pub fn new(config: ClientConfig) -> RpcClient {
        let service = WsRemoteService::new(config.invocation_timeout);
        RpcClient {
            invoker: Arc::new(ResilientInvoker::new(WsTransport::new(config), service)),
            options: ProxyOptions::default(),
        }
    }

    /// Creates a client and opens its first connection.
    pub async fn connect(config: ClientConfig) -> Result<RpcClient, RpcFailure> {
        let client = RpcClient::new(config);
        client.invoker.transport().acquire_delegate(true).await?;
        Ok(client)
    }

    /// A client for the same server with different call settings.
    pub fn with_proxy_options(&self, options: ProxyOptions) -> RpcClient {
        RpcClient {
            invoker: self.invoker.clone(),
            options,
        }
    }

    pub fn transport(&self) -> &WsTransport {
        self.invoker.transport()
    }
}

#[async_trait::async_trait]
impl RpcServiceCallerInterface for RpcClient {
    fn proxy_options(&self) -> &ProxyOptions {
        &self.options
    }

    async fn invoke_call(
        &self,
        call: &CallDescriptor,
        context: Option<&Context>,
    ) -> Result<Vec<u8>, InvokeError> {
        self.invoker.invoke(call, context).await
    }
}
