use crate::{
    CallDescriptor, Context, FailureClass, GiveUpReason, InvokeError, RemoteService,
    RetryDecision, RpcFailure, Transport,
};

/// Runs one logical remote call to completion, absorbing transient
/// connectivity failures for as long as the transport's retry policy allows.
///
/// Each `invoke` owns its own retry counter and delegate; concurrent calls on
/// the same invoker share nothing but the transport itself.
///
/// ```text
/// START -> ACQUIRING_DELEGATE -> CALLING -> SUCCESS
///                                        -> TRANSIENT_FAILURE -> (retry) ACQUIRING_DELEGATE
///                                                             -> (give up) FAILURE
///                                        -> APPLICATION / PERMANENT -> FAILURE
/// ```
pub struct ResilientInvoker<T, S> {
    transport: T,
    service: S,
}

impl<T, S> ResilientInvoker<T, S>
where
    T: Transport,
    S: RemoteService<T::Delegate>,
{
    pub fn new(transport: T, service: S) -> Self {
        Self { transport, service }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Executes `call`, returning the result of exactly one successful remote
    /// execution or a single terminal error.
    ///
    /// A `None` context is sent as the empty context.
    #[tracing::instrument(level = "debug", skip_all, fields(operation = %call.operation))]
    pub async fn invoke(
        &self,
        call: &CallDescriptor,
        context: Option<&Context>,
    ) -> Result<S::Output, InvokeError> {
        if call.twoway_only && call.is_one_way() {
            return Err(InvokeError::Permanent(RpcFailure::TwowayOnly {
                operation: call.operation.clone(),
            }));
        }

        let empty_context;
        let context = match context {
            Some(context) => context,
            None => {
                empty_context = Context::empty();
                &empty_context
            }
        };

        let mut retry_count: u32 = 0;

        loop {
            let attempt = retry_count + 1;
            tracing::trace!(attempt, "acquiring delegate");

            let (failure, class) = match self.transport.acquire_delegate(retry_count == 0).await {
                Ok(mut delegate) => match self.service.execute(&mut delegate, call, context).await {
                    Ok(output) => return Ok(output),
                    Err(failure) => {
                        let class = self.transport.classify_failure(&failure);
                        if class == FailureClass::Transient {
                            self.transport.discard_delegate(delegate, &failure);
                        }
                        (failure, class)
                    }
                },
                Err(failure) => {
                    let class = self.transport.classify_failure(&failure);
                    (failure, class)
                }
            };

            match class {
                FailureClass::Application => return Err(InvokeError::Application(failure)),
                FailureClass::Permanent => return Err(InvokeError::Permanent(failure)),
                FailureClass::Transient => {}
            }

            match self.transport.retry_policy(retry_count, &failure, call).await {
                RetryDecision::Retry => {
                    retry_count += 1;
                    tracing::debug!(attempt, "transient failure, retrying");
                }
                RetryDecision::GiveUp(GiveUpReason::BudgetExhausted) => {
                    return Err(InvokeError::RetryExhausted {
                        attempts: attempt,
                        last: failure,
                    });
                }
                RetryDecision::GiveUp(GiveUpReason::NotRetryable) => {
                    return Err(InvokeError::Transient(failure));
                }
            }
        }
    }
}
