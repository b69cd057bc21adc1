use tenacio::{CallDescriptor, CallMode, Context, FailureClass, ProxyOptions, RpcFailure};

#[test]
fn test_implicit_call_uses_default_context() {
    let default: Context = [("locale", "en")].into_iter().collect();
    let options = ProxyOptions::new().with_context(default.clone());

    assert_eq!(options.resolve_context(None), Some(&default));
}

#[test]
fn test_explicit_empty_context_overrides_default() {
    let default: Context = [("locale", "en")].into_iter().collect();
    let options = ProxyOptions::new().with_context(default);
    let empty = Context::empty();

    let resolved = options.resolve_context(Some(&empty)).unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn test_apply_stamps_mode_and_facet() {
    let options = ProxyOptions::new().with_one_way().with_facet("metadata");
    let call = options.apply(CallDescriptor::new("setMetadataCollected", 9, vec![1]));

    assert_eq!(call.call_mode, CallMode::OneWay);
    assert_eq!(call.facet.as_deref(), Some("metadata"));

    let two_way = options
        .clone()
        .with_two_way()
        .with_facet("")
        .apply(call);
    assert_eq!(two_way.call_mode, CallMode::TwoWay);
    assert_eq!(two_way.facet, None);
}

#[test]
fn test_context_entries_are_sorted_and_shared() {
    let context: Context = [("b", "2"), ("a", "1")].into_iter().collect();
    let clone = context.clone();

    assert_eq!(context.get("a"), Some("1"));
    assert_eq!(context.len(), 2);
    assert_eq!(
        clone.to_vec(),
        vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
    );
}

#[test]
fn test_default_failure_classification() {
    assert_eq!(
        RpcFailure::Overloaded {
            reason: "busy".into()
        }
        .class(),
        FailureClass::Transient
    );
    assert_eq!(
        RpcFailure::user_error("file not found").class(),
        FailureClass::Application
    );
    assert_eq!(
        RpcFailure::FacetNotExist {
            facet: "x".into()
        }
        .class(),
        FailureClass::Permanent
    );
    assert!(!RpcFailure::ConnectionRefused { reason: "x".into() }.request_sent());
    assert!(RpcFailure::user_error("x").request_sent());
}
