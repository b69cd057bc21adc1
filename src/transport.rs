use crate::{CallDescriptor, Context, FailureClass, RetryDecision, RpcFailure};

/// Supplies delegates (usable connections) and decides how failures are
/// treated.
///
/// Implementations own connection caching, timeouts and backoff timing; the
/// invoker only asks for a delegate, hands it back on failure, and consults
/// the retry policy.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// A handle used for exactly one call attempt.
    type Delegate: Send;

    /// Obtains a delegate. With `allow_cached` the transport may return a
    /// previously established connection.
    async fn acquire_delegate(&self, allow_cached: bool) -> Result<Self::Delegate, RpcFailure>;

    fn classify_failure(&self, failure: &RpcFailure) -> FailureClass {
        failure.class()
    }

    /// Decides whether a transiently failed call gets another attempt.
    ///
    /// `retry_count` is the number of retries already performed for this
    /// logical call.
    async fn retry_policy(
        &self,
        retry_count: u32,
        failure: &RpcFailure,
        call: &CallDescriptor,
    ) -> RetryDecision;

    /// Receives the delegate of an attempt that failed transiently.
    fn discard_delegate(&self, delegate: Self::Delegate, failure: &RpcFailure) {
        let _ = failure;
        drop(delegate);
    }
}

/// Executes a call descriptor on a delegate.
///
/// For one-way calls `execute` returns once the transport has accepted the
/// request; it does not wait for the remote side to process it.
#[async_trait::async_trait]
pub trait RemoteService<D>: Send + Sync
where
    D: Send,
{
    type Output: Send;

    async fn execute(
        &self,
        delegate: &mut D,
        call: &CallDescriptor,
        context: &Context,
    ) -> Result<Self::Output, RpcFailure>;
}
