use crate::error::RpcCallerError;
use tenacio::{CallDescriptor, Context, InvokeError, ProxyOptions};
use tenacio_rpc_service::RpcOperation;

/// Defines a generic capability for making RPC calls.
///
/// Any struct that can run a call descriptor through a resilient invoker
/// (e.g., a client, or a server acting as a client) can implement this trait
/// to gain typed operation calls.
#[async_trait::async_trait]
pub trait RpcServiceCallerInterface: Send + Sync {
    // --- METHODS TO BE IMPLEMENTED BY THE STRUCT (e.g., RpcClient) ---

    /// The call mode, default context and facet applied to every call.
    fn proxy_options(&self) -> &ProxyOptions;

    /// Runs one logical call to completion and returns the raw reply
    /// payload (empty for one-way calls).
    async fn invoke_call(
        &self,
        call: &CallDescriptor,
        context: Option<&Context>,
    ) -> Result<Vec<u8>, InvokeError>;

    // --- METHODS PROVIDED AUTOMATICALLY BY THE TRAIT ---

    /// Encodes `input`, invokes `Op` with this caller's proxy options and
    /// decodes the result.
    ///
    /// `context: None` uses the proxy's default context.
    async fn call_operation<Op>(
        &self,
        input: Op::Input,
        context: Option<&Context>,
    ) -> Result<Op::Output, RpcCallerError>
    where
        Op: RpcOperation + Send + Sync + 'static,
        Op::Input: Send + 'static,
        Op::Output: Send + 'static,
    {
        let call = self
            .proxy_options()
            .apply(Op::call_descriptor(input).map_err(RpcCallerError::Encode)?);
        let context = self.proxy_options().resolve_context(context);

        tracing::trace!(operation = Op::NAME, one_way = call.is_one_way(), "calling");

        let reply = self.invoke_call(&call, context).await?;

        Op::decode_response(&reply).map_err(RpcCallerError::Decode)
    }
}
