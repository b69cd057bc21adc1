use crate::Connection;
use std::time::Duration;
use tenacio::utils::next_request_id;
use tenacio::{CallDescriptor, Context, RemoteService, RpcFailure};
use tenacio_rpc_service::RequestEnvelope;

/// Sends one request over a [`Connection`] and waits for its reply.
#[derive(Debug, Clone, Default)]
pub struct WsRemoteService {
    invocation_timeout: Option<Duration>,
}

impl WsRemoteService {
    pub fn new(invocation_timeout: Option<Duration>) -> Self {
        Self { invocation_timeout }
    }
}

#[async_trait::async_trait]
impl RemoteService<Connection> for WsRemoteService {
    type Output = Vec<u8>;

    async fn execute(
        &self,
        delegate: &mut Connection,
        call: &CallDescriptor,
        context: &Context,
    ) -> Result<Vec<u8>, RpcFailure> {
        let request = RequestEnvelope::from_call(next_request_id(), call, context);

        let Some(waiter) = delegate.send_request(&request).await? else {
            return Ok(Vec::new());
        };

        let reply = match self.invocation_timeout {
            Some(limit) => match tokio::time::timeout(limit, waiter).await {
                Ok(reply) => reply,
                Err(_) => {
                    delegate.forget(request.request_id).await;
                    return Err(RpcFailure::Timeout { request_sent: true });
                }
            },
            None => waiter.await,
        };

        let reply = reply.map_err(|_| RpcFailure::ConnectionLost {
            request_sent: true,
            reason: "connection closed before the reply arrived".into(),
        })?;

        reply.into_result(&call.operation, &request.facet)
    }
}
