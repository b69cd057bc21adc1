//! Resilient invocation of remote calls.
//!
//! A logical call is described by a [`CallDescriptor`] and executed by a
//! [`ResilientInvoker`], which acquires a delegate from a [`Transport`],
//! hands it to a [`RemoteService`], and retries transient connectivity
//! failures as the transport's retry policy allows. Application and permanent
//! failures propagate on first occurrence.
//!
//! This crate owns no runtime, socket or wire format; those belong to the
//! transport implementations built on top of it.

mod call;
pub use call::{CallDescriptor, CallMode, Context, OperationMode};

mod error;
pub use error::{InvokeError, InvokeErrorKind};

mod failure;
pub use failure::{FailureClass, RpcFailure};

mod invoker;
pub use invoker::ResilientInvoker;

mod proxy;
pub use proxy::ProxyOptions;

mod retry;
pub use retry::{GiveUpReason, RetryDecision, RetryIntervals, RetryIntervalsParseError, RetryPlan};

mod transport;
pub use transport::{RemoteService, Transport};

pub mod utils;
