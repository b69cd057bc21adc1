use std::time::Duration;
use tenacio::{
    CallDescriptor, GiveUpReason, OperationMode, RetryDecision, RetryIntervals, RetryPlan,
    RpcFailure,
};

fn lost(request_sent: bool) -> RpcFailure {
    RpcFailure::ConnectionLost {
        request_sent,
        reason: "reset".into(),
    }
}

#[test]
fn test_parses_interval_list() {
    let policy = RetryIntervals::parse("0 100 500").unwrap();
    assert_eq!(
        policy.intervals(),
        &[
            Duration::ZERO,
            Duration::from_millis(100),
            Duration::from_millis(500)
        ]
    );
    assert_eq!(policy.budget(), 3);
    assert_eq!(RetryIntervals::parse("-1").unwrap().budget(), 0);
    assert_eq!(RetryIntervals::parse("").unwrap().budget(), 0);
    assert!(RetryIntervals::parse("10 abc").is_err());
}

#[test]
fn test_parse_error_names_the_bad_entry() {
    let err = RetryIntervals::parse("0 100 -5").unwrap_err();

    assert_eq!(err.part, "-5");
    assert!(err.to_string().starts_with("invalid retry interval \"-5\""));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_default_policy_retries_once_immediately() {
    let policy = RetryIntervals::default();
    let call = CallDescriptor::new("getSizeX", 1, vec![]);

    assert_eq!(
        policy.decide(0, &lost(false), &call),
        RetryPlan::Retry {
            after: Duration::ZERO
        }
    );
    assert_eq!(
        policy.decide(1, &lost(false), &call),
        RetryPlan::GiveUp(GiveUpReason::BudgetExhausted)
    );
}

#[test]
fn test_budget_runs_out_after_last_interval() {
    let policy = RetryIntervals::parse("0 100").unwrap();
    let call = CallDescriptor::new("getSizeX", 1, vec![]);

    assert_eq!(
        policy.decide(1, &lost(false), &call),
        RetryPlan::Retry {
            after: Duration::from_millis(100)
        }
    );
    let exhausted = policy.decide(2, &lost(false), &call);
    assert_eq!(exhausted, RetryPlan::GiveUp(GiveUpReason::BudgetExhausted));
    assert_eq!(
        exhausted.decision(),
        RetryDecision::GiveUp(GiveUpReason::BudgetExhausted)
    );
}

#[test]
fn test_sent_requests_only_retry_when_idempotent() {
    let policy = RetryIntervals::immediate(3);
    let normal = CallDescriptor::new("setId", 2, vec![]);
    let idempotent = normal
        .clone()
        .with_operation_mode(OperationMode::Idempotent);

    assert_eq!(
        policy.decide(0, &lost(true), &normal),
        RetryPlan::GiveUp(GiveUpReason::NotRetryable)
    );
    assert_eq!(
        policy.decide(0, &RpcFailure::Timeout { request_sent: true }, &normal),
        RetryPlan::GiveUp(GiveUpReason::NotRetryable)
    );
    assert_eq!(
        policy.decide(0, &lost(true), &idempotent),
        RetryPlan::Retry {
            after: Duration::ZERO
        }
    );
}
