use crate::RpcFailure;
use std::fmt;

/// Coarse kind of a terminal invocation error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InvokeErrorKind {
    TransientConnectivityFailure,
    RetryExhausted,
    ApplicationFailure,
    PermanentTransportFailure,
}

/// The single terminal error returned by a logical call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// A transient failure the retry policy refused to retry, e.g. because
    /// a non-idempotent request may already have been delivered.
    Transient(RpcFailure),
    /// Every attempt the retry policy allowed failed transiently.
    RetryExhausted { attempts: u32, last: RpcFailure },
    /// The remote operation rejected the call.
    Application(RpcFailure),
    /// Retrying could never succeed.
    Permanent(RpcFailure),
}

impl InvokeError {
    pub fn kind(&self) -> InvokeErrorKind {
        match self {
            InvokeError::Transient(_) => InvokeErrorKind::TransientConnectivityFailure,
            InvokeError::RetryExhausted { .. } => InvokeErrorKind::RetryExhausted,
            InvokeError::Application(_) => InvokeErrorKind::ApplicationFailure,
            InvokeError::Permanent(_) => InvokeErrorKind::PermanentTransportFailure,
        }
    }

    /// The underlying failure that ended the call.
    pub fn failure(&self) -> &RpcFailure {
        match self {
            InvokeError::Transient(failure)
            | InvokeError::Application(failure)
            | InvokeError::Permanent(failure) => failure,
            InvokeError::RetryExhausted { last, .. } => last,
        }
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::Transient(failure) => write!(f, "transient failure: {failure}"),
            InvokeError::RetryExhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts: {last}")
            }
            InvokeError::Application(failure) => write!(f, "application failure: {failure}"),
            InvokeError::Permanent(failure) => write!(f, "permanent failure: {failure}"),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.failure())
    }
}
