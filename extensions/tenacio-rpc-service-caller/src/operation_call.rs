use crate::{RpcServiceCallerInterface, error::RpcCallerError};
use tenacio::Context;
use tenacio_rpc_service::RpcOperation;

/// Trait for types that represent callable RPC operations.
///
/// This is the generated call site: downstream users write
/// `GetSizeX::call(&client, ())` without touching descriptors, invokers or
/// transports.
#[async_trait::async_trait]
pub trait RpcCallOperation: RpcOperation + Sized + Send + Sync {
    async fn call<C: RpcServiceCallerInterface>(
        rpc_client: &C,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError>;

    /// Like `call`, with an explicit context that replaces the proxy's
    /// default context.
    async fn call_with_context<C: RpcServiceCallerInterface>(
        rpc_client: &C,
        input: Self::Input,
        context: &Context,
    ) -> Result<Self::Output, RpcCallerError>;
}

#[async_trait::async_trait]
impl<T> RpcCallOperation for T
where
    T: RpcOperation + Send + Sync + 'static,
    T::Input: Send + 'static,
    T::Output: Send + 'static,
{
    async fn call<C: RpcServiceCallerInterface>(
        rpc_client: &C,
        input: Self::Input,
    ) -> Result<Self::Output, RpcCallerError> {
        rpc_client.call_operation::<T>(input, None).await
    }

    async fn call_with_context<C: RpcServiceCallerInterface>(
        rpc_client: &C,
        input: Self::Input,
        context: &Context,
    ) -> Result<Self::Output, RpcCallerError> {
        rpc_client.call_operation::<T>(input, Some(context)).await
    }
}
