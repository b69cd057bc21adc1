use super::{
    HandlerError, RegisteredOperation,
    error::{HandlerPayloadError, RpcServiceEndpointError},
    with_handlers_trait::WithHandlers,
};
use std::{future::Future, marker::Send, sync::Arc};
use tenacio::{Context, OperationMode};
use tenacio_rpc_service::{
    DEFAULT_FACET, ReplyEnvelope, RequestEnvelope, RpcOperation, RpcResultStatus,
    builtin::{IsA, Ping},
};

/// The status and payload a request resolved to.
pub type DispatchOutcome = (RpcResultStatus, Vec<u8>);

#[async_trait::async_trait]
pub trait RpcServiceEndpointInterface<C>: Send + Sync
where
    C: Send + Sync + Clone + 'static,
{
    type HandlersLock: WithHandlers<C>;

    fn get_prebuffered_handlers(&self) -> Arc<Self::HandlersLock>;

    /// Registers a raw handler for `method_id` on `facet`.
    ///
    /// The handler receives the connection context, the encoded arguments and
    /// the request context, and returns the encoded result.
    async fn register_prebuffered<F, Fut>(
        &self,
        facet: &str,
        method_id: u64,
        name: &str,
        mode: OperationMode,
        handler: F,
    ) -> Result<(), RpcServiceEndpointError>
    where
        F: Fn(C, Vec<u8>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<u8>, HandlerError>> + Send + 'static,
    {
        let wrapped = move |ctx: C, bytes: Vec<u8>, request_context: Context| {
            Box::pin(handler(ctx, bytes, request_context))
                as std::pin::Pin<Box<dyn Future<Output = _> + Send>>
        };
        let operation = RegisteredOperation {
            name: name.to_string(),
            mode,
            handler: Arc::new(wrapped),
        };
        self.get_prebuffered_handlers()
            .with_handlers(|handlers| handlers.insert(facet, method_id, operation))
            .await
            .map_err(RpcServiceEndpointError::Registration)
    }

    /// Registers a typed handler for `Op` on the default facet.
    async fn register_operation<Op, F, Fut>(&self, handler: F) -> Result<(), RpcServiceEndpointError>
    where
        Op: RpcOperation + 'static,
        Op::Input: Send + 'static,
        Op::Output: Send + 'static,
        F: Fn(C, Op::Input, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Op::Output, HandlerError>> + Send + 'static,
    {
        self.register_facet_operation::<Op, F, Fut>(DEFAULT_FACET, handler)
            .await
    }

    /// Registers a typed handler for `Op` on `facet`.
    async fn register_facet_operation<Op, F, Fut>(
        &self,
        facet: &str,
        handler: F,
    ) -> Result<(), RpcServiceEndpointError>
    where
        Op: RpcOperation + 'static,
        Op::Input: Send + 'static,
        Op::Output: Send + 'static,
        F: Fn(C, Op::Input, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Op::Output, HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.register_prebuffered(
            facet,
            Op::METHOD_ID,
            Op::NAME,
            Op::MODE,
            move |ctx: C, bytes: Vec<u8>, request_context: Context| {
                let handler = handler.clone();
                async move {
                    let input = Op::decode_request(&bytes)?;
                    let output = handler(ctx, input, request_context).await?;
                    Ok::<_, HandlerError>(Op::encode_response(output)?)
                }
            },
        )
        .await
    }

    /// Declares that `facet` implements `type_id`, creating the facet if it
    /// does not exist yet.
    async fn add_type_id(&self, facet: &str, type_id: &str) {
        self.get_prebuffered_handlers()
            .with_handlers(|handlers| {
                handlers
                    .facet_mut(facet)
                    .type_ids
                    .insert(type_id.to_string());
            })
            .await
    }

    /// Dispatches one request. One-way requests never produce a reply.
    async fn dispatch(&self, context: C, request: RequestEnvelope) -> Option<ReplyEnvelope> {
        let (status, payload) = self.dispatch_request(context, &request).await;

        if request.is_one_way() {
            if status != RpcResultStatus::Success {
                tracing::debug!(
                    operation = %request.operation,
                    ?status,
                    "one-way request failed"
                );
            }
            return None;
        }

        Some(if status == RpcResultStatus::Success {
            ReplyEnvelope::success(request.request_id, payload)
        } else {
            ReplyEnvelope::failure(request.request_id, status, payload)
        })
    }

    /// Decodes one request frame, dispatches it, and returns the encoded
    /// reply if there is one.
    async fn read_bytes(
        &self,
        context: C,
        bytes: &[u8],
    ) -> Result<Option<Vec<u8>>, RpcServiceEndpointError> {
        let request = RequestEnvelope::decode(bytes)?;
        Ok(self
            .dispatch(context, request)
            .await
            .map(|reply| reply.encode()))
    }

    #[doc(hidden)]
    async fn dispatch_request(&self, context: C, request: &RequestEnvelope) -> DispatchOutcome {
        let handlers = self.get_prebuffered_handlers();
        let facet = request.facet.clone();
        let method_id = request.method_id;

        let lookup = handlers
            .with_handlers(|table| {
                table.facet(&facet).map(|facet| {
                    if method_id == IsA::METHOD_ID {
                        Lookup::TypeIds(facet.type_ids.iter().cloned().collect::<Vec<_>>())
                    } else if method_id == Ping::METHOD_ID {
                        Lookup::Ping
                    } else {
                        match facet.operations.get(&method_id) {
                            Some(operation) => Lookup::Operation(operation.clone()),
                            None => Lookup::Missing,
                        }
                    }
                })
            })
            .await;

        let operation = match lookup {
            None => return (RpcResultStatus::FacetNotExist, Vec::new()),
            Some(Lookup::Missing) => return (RpcResultStatus::OperationNotExist, Vec::new()),
            Some(Lookup::Ping) => return (RpcResultStatus::Success, Vec::new()),
            Some(Lookup::TypeIds(type_ids)) => return answer_is_a(&type_ids, &request.payload),
            Some(Lookup::Operation(operation)) => operation,
        };

        // A normal call to an idempotent operation is merely conservative.
        if operation.mode == OperationMode::Normal
            && request.operation_mode() == OperationMode::Idempotent
        {
            return (RpcResultStatus::ModeMismatch, Vec::new());
        }

        match (operation.handler)(context, request.payload.clone(), request.context()).await {
            Ok(encoded) => (RpcResultStatus::Success, encoded),
            Err(e) => {
                if let Some(payload_error) = e.downcast_ref::<HandlerPayloadError>() {
                    (RpcResultStatus::UserError, payload_error.0.clone())
                } else {
                    (RpcResultStatus::SystemError, e.to_string().into_bytes())
                }
            }
        }
    }
}

enum Lookup<C> {
    TypeIds(Vec<String>),
    Ping,
    Operation(RegisteredOperation<C>),
    Missing,
}

fn answer_is_a(type_ids: &[String], payload: &[u8]) -> DispatchOutcome {
    let answer = IsA::decode_request(payload)
        .and_then(|type_id| IsA::encode_response(type_ids.iter().any(|t| *t == type_id)));
    match answer {
        Ok(encoded) => (RpcResultStatus::Success, encoded),
        Err(e) => (RpcResultStatus::SystemError, e.to_string().into_bytes()),
    }
}
