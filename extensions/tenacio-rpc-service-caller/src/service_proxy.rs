use crate::{RpcServiceCallerInterface, error::RpcCallerError};
use std::marker::PhantomData;
use tenacio::{Context, RpcFailure};
use tenacio_rpc_service::{RpcOperation, ServiceType, builtin::IsA};

/// A caller narrowed to one service interface.
pub struct ServiceProxy<C, S> {
    client: C,
    _service: PhantomData<fn() -> S>,
}

impl<C, S> ServiceProxy<C, S>
where
    C: RpcServiceCallerInterface,
    S: ServiceType,
{
    /// Narrows `client` after asking the remote object whether it implements
    /// `S`.
    ///
    /// Returns `Ok(None)` when it does not, or when the client's facet does
    /// not exist on the remote object.
    pub async fn checked_cast(client: C) -> Result<Option<Self>, RpcCallerError> {
        Self::checked_cast_with_context(client, None).await
    }

    pub async fn checked_cast_with_context(
        client: C,
        context: Option<&Context>,
    ) -> Result<Option<Self>, RpcCallerError> {
        match client
            .call_operation::<IsA>(S::TYPE_ID.to_string(), context)
            .await
        {
            Ok(true) => Ok(Some(Self::unchecked_cast(client))),
            Ok(false) => Ok(None),
            Err(RpcCallerError::Invoke(e))
                if matches!(e.failure(), RpcFailure::FacetNotExist { .. }) =>
            {
                tracing::debug!(type_id = S::TYPE_ID, "facet does not exist");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Narrows `client` without contacting the remote object.
    pub fn unchecked_cast(client: C) -> Self {
        Self {
            client,
            _service: PhantomData,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    pub async fn call<Op>(&self, input: Op::Input) -> Result<Op::Output, RpcCallerError>
    where
        Op: RpcOperation + Send + Sync + 'static,
        Op::Input: Send + 'static,
        Op::Output: Send + 'static,
    {
        self.client.call_operation::<Op>(input, None).await
    }
}
