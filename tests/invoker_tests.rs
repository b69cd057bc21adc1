use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use tenacio::{
    CallDescriptor, CallMode, Context, InvokeError, InvokeErrorKind, OperationMode,
    RemoteService, ResilientInvoker, RetryDecision, RetryIntervals, RpcFailure, Transport,
};

// --- Test Setup: Scripted Collaborators ---

/// What happens on one attempt.
#[derive(Clone)]
enum Step {
    AcquireFails(RpcFailure),
    CallFails(RpcFailure),
    Returns(i32),
}

struct ScriptedDelegate {
    outcome: Result<i32, RpcFailure>,
}

/// A transport that plays back a fixed script, one step per delegate
/// acquisition. Once the script is exhausted every attempt fails transiently.
struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    policy: RetryIntervals,
    acquisitions: AtomicU32,
    discarded: AtomicU32,
    allow_cached_flags: Mutex<Vec<bool>>,
}

impl ScriptedTransport {
    fn new(steps: Vec<Step>, policy: RetryIntervals) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            policy,
            acquisitions: AtomicU32::new(0),
            discarded: AtomicU32::new(0),
            allow_cached_flags: Mutex::new(Vec::new()),
        }
    }

    fn acquisitions(&self) -> u32 {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    type Delegate = ScriptedDelegate;

    async fn acquire_delegate(&self, allow_cached: bool) -> Result<ScriptedDelegate, RpcFailure> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.allow_cached_flags.lock().unwrap().push(allow_cached);

        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Step::CallFails(connection_lost()));

        match step {
            Step::AcquireFails(failure) => Err(failure),
            Step::CallFails(failure) => Ok(ScriptedDelegate {
                outcome: Err(failure),
            }),
            Step::Returns(value) => Ok(ScriptedDelegate { outcome: Ok(value) }),
        }
    }

    async fn retry_policy(
        &self,
        retry_count: u32,
        failure: &RpcFailure,
        call: &CallDescriptor,
    ) -> RetryDecision {
        self.policy.decide(retry_count, failure, call).decision()
    }

    fn discard_delegate(&self, _delegate: ScriptedDelegate, _failure: &RpcFailure) {
        self.discarded.fetch_add(1, Ordering::SeqCst);
    }
}

/// Returns whatever the delegate was scripted with, recording the contexts
/// it was handed.
#[derive(Default)]
struct EchoService {
    contexts: Mutex<Vec<Context>>,
}

#[async_trait::async_trait]
impl RemoteService<ScriptedDelegate> for EchoService {
    type Output = i32;

    async fn execute(
        &self,
        delegate: &mut ScriptedDelegate,
        _call: &CallDescriptor,
        context: &Context,
    ) -> Result<i32, RpcFailure> {
        self.contexts.lock().unwrap().push(context.clone());
        delegate.outcome.clone()
    }
}

fn connection_lost() -> RpcFailure {
    RpcFailure::ConnectionLost {
        request_sent: false,
        reason: "connection reset by peer".into(),
    }
}

fn get_size_x() -> CallDescriptor {
    CallDescriptor::new("getSizeX", 1, vec![]).with_twoway_only(true)
}

fn invoker(steps: Vec<Step>, policy: RetryIntervals) -> ResilientInvoker<ScriptedTransport, EchoService> {
    ResilientInvoker::new(ScriptedTransport::new(steps, policy), EchoService::default())
}

// --- Unit Tests ---

#[tokio::test]
async fn test_transient_failures_then_success() {
    for failures in 0..5 {
        let mut steps = vec![Step::CallFails(connection_lost()); failures];
        steps.push(Step::Returns(7));
        let invoker = invoker(steps, RetryIntervals::immediate(5));

        let result = invoker.invoke(&get_size_x(), None).await;

        assert_eq!(result, Ok(7));
        assert_eq!(invoker.transport().acquisitions(), failures as u32 + 1);
        assert_eq!(
            invoker.transport().discarded.load(Ordering::SeqCst),
            failures as u32
        );
    }
}

#[tokio::test]
async fn test_get_size_x_succeeds_on_third_attempt() {
    let invoker = invoker(
        vec![
            Step::CallFails(connection_lost()),
            Step::CallFails(connection_lost()),
            Step::Returns(512),
        ],
        RetryIntervals::immediate(3),
    );

    let result = invoker.invoke(&get_size_x(), None).await;

    assert_eq!(result, Ok(512));
    assert_eq!(invoker.transport().acquisitions(), 3);
}

#[tokio::test]
async fn test_application_failure_is_not_retried() {
    let invoker = invoker(
        vec![Step::CallFails(RpcFailure::user_error("file not found"))],
        RetryIntervals::immediate(3),
    );
    let set_id = CallDescriptor::new("setId", 2, b"bad/path".to_vec());

    let err = invoker.invoke(&set_id, None).await.unwrap_err();

    assert_eq!(err.kind(), InvokeErrorKind::ApplicationFailure);
    assert_eq!(
        err,
        InvokeError::Application(RpcFailure::user_error("file not found"))
    );
    assert_eq!(invoker.transport().acquisitions(), 1);
    assert_eq!(invoker.transport().discarded.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    let invoker = invoker(
        vec![Step::CallFails(RpcFailure::OperationNotExist {
            operation: "getSizeQ".into(),
        })],
        RetryIntervals::immediate(3),
    );

    let err = invoker.invoke(&get_size_x(), None).await.unwrap_err();

    assert_eq!(err.kind(), InvokeErrorKind::PermanentTransportFailure);
    assert_eq!(invoker.transport().acquisitions(), 1);
}

#[tokio::test]
async fn test_retry_budget_exhausted() {
    let budget = 3;
    let invoker = invoker(vec![], RetryIntervals::immediate(budget));

    let err = invoker.invoke(&get_size_x(), None).await.unwrap_err();

    assert_eq!(err.kind(), InvokeErrorKind::RetryExhausted);
    assert_eq!(
        err,
        InvokeError::RetryExhausted {
            attempts: budget as u32 + 1,
            last: connection_lost(),
        }
    );
    assert_eq!(invoker.transport().acquisitions(), budget as u32 + 1);
}

#[tokio::test]
async fn test_no_retry_policy_fails_after_one_attempt() {
    let invoker = invoker(vec![], RetryIntervals::none());

    let err = invoker.invoke(&get_size_x(), None).await.unwrap_err();

    assert_eq!(err.kind(), InvokeErrorKind::RetryExhausted);
    assert_eq!(invoker.transport().acquisitions(), 1);
}

#[tokio::test]
async fn test_failed_acquisition_counts_as_attempt() {
    let refused = RpcFailure::ConnectionRefused {
        reason: "no listener".into(),
    };
    let invoker = invoker(
        vec![Step::AcquireFails(refused.clone()), Step::Returns(3)],
        RetryIntervals::immediate(1),
    );

    assert_eq!(invoker.invoke(&get_size_x(), None).await, Ok(3));
    assert_eq!(invoker.transport().acquisitions(), 2);
    // No delegate existed for the refused attempt.
    assert_eq!(invoker.transport().discarded.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_only_first_attempt_allows_cached_delegate() {
    let invoker = invoker(
        vec![
            Step::CallFails(connection_lost()),
            Step::CallFails(connection_lost()),
            Step::Returns(1),
        ],
        RetryIntervals::immediate(2),
    );

    invoker.invoke(&get_size_x(), None).await.unwrap();

    assert_eq!(
        *invoker.transport().allow_cached_flags.lock().unwrap(),
        vec![true, false, false]
    );
}

#[tokio::test]
async fn test_sent_request_is_not_resent_for_normal_operation() {
    let sent = RpcFailure::ConnectionLost {
        request_sent: true,
        reason: "reset after write".into(),
    };
    let invoker = invoker(
        vec![Step::CallFails(sent.clone()), Step::Returns(1)],
        RetryIntervals::immediate(3),
    );
    let set_id = CallDescriptor::new("setId", 2, b"a.tif".to_vec());

    let err = invoker.invoke(&set_id, None).await.unwrap_err();

    assert_eq!(err, InvokeError::Transient(sent));
    assert_eq!(err.kind(), InvokeErrorKind::TransientConnectivityFailure);
    assert_eq!(invoker.transport().acquisitions(), 1);
}

#[tokio::test]
async fn test_sent_request_is_resent_for_idempotent_operation() {
    let sent = RpcFailure::Timeout { request_sent: true };
    let invoker = invoker(
        vec![Step::CallFails(sent), Step::Returns(42)],
        RetryIntervals::immediate(3),
    );
    let call = get_size_x().with_operation_mode(OperationMode::Idempotent);

    assert_eq!(invoker.invoke(&call, None).await, Ok(42));
    assert_eq!(invoker.transport().acquisitions(), 2);
}

#[tokio::test]
async fn test_value_returning_operation_cannot_be_one_way() {
    let invoker = invoker(vec![Step::Returns(1)], RetryIntervals::immediate(3));
    let call = get_size_x().with_call_mode(CallMode::OneWay);

    let err = invoker.invoke(&call, None).await.unwrap_err();

    assert_eq!(
        err,
        InvokeError::Permanent(RpcFailure::TwowayOnly {
            operation: "getSizeX".into()
        })
    );
    assert_eq!(invoker.transport().acquisitions(), 0);
}

#[tokio::test]
async fn test_repeated_read_returns_same_result() {
    let invoker = invoker(
        vec![Step::Returns(512), Step::Returns(512)],
        RetryIntervals::immediate(1),
    );
    let call = get_size_x();

    let first = invoker.invoke(&call, None).await;
    let second = invoker.invoke(&call, None).await;

    assert_eq!(first, Ok(512));
    assert_eq!(first, second);
    assert_eq!(invoker.transport().acquisitions(), 2);
}

#[tokio::test]
async fn test_context_is_passed_through_unmodified() {
    let invoker = invoker(
        vec![
            Step::CallFails(connection_lost()),
            Step::Returns(1),
            Step::Returns(2),
        ],
        RetryIntervals::immediate(1),
    );
    let context: Context = [("user", "curtis"), ("series", "0")].into_iter().collect();

    invoker.invoke(&get_size_x(), Some(&context)).await.unwrap();
    invoker.invoke(&get_size_x(), None).await.unwrap();

    let seen = invoker.service().contexts.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0], context);
    assert_eq!(seen[1], context);
    assert!(seen[2].is_empty());
}
