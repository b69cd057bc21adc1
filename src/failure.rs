use std::fmt;

/// How the invoker should treat a failure reported by a collaborator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailureClass {
    /// Connectivity problem; the call may be attempted again.
    Transient,
    /// The remote operation rejected the call.
    Application,
    /// Retrying cannot succeed (protocol mismatch, unknown operation, ...).
    Permanent,
}

/// A raw failure reported by a `Transport` or `RemoteService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcFailure {
    /// The endpoint could not be reached. Nothing was sent.
    ConnectionRefused { reason: String },
    /// The connection dropped. `request_sent` is true when the request may
    /// already have been delivered.
    ConnectionLost { request_sent: bool, reason: String },
    /// The transport gave up waiting.
    Timeout { request_sent: bool },
    /// The endpoint is temporarily refusing work. Nothing was executed.
    Overloaded { reason: String },
    /// The remote operation raised a declared error.
    UserError { payload: Vec<u8> },
    OperationNotExist { operation: String },
    FacetNotExist { facet: String },
    ObjectNotExist,
    /// A value-returning operation was issued as a one-way call.
    TwowayOnly { operation: String },
    /// Caller and servant disagree on the operation mode.
    ModeMismatch { operation: String },
    Protocol(String),
    Decode(String),
    /// The remote side failed outside of the operation's declared errors.
    System(String),
}

impl RpcFailure {
    /// Default classification used when a transport does not override it.
    pub fn class(&self) -> FailureClass {
        match self {
            RpcFailure::ConnectionRefused { .. }
            | RpcFailure::ConnectionLost { .. }
            | RpcFailure::Timeout { .. }
            | RpcFailure::Overloaded { .. } => FailureClass::Transient,
            RpcFailure::UserError { .. } | RpcFailure::System(_) => FailureClass::Application,
            RpcFailure::OperationNotExist { .. }
            | RpcFailure::FacetNotExist { .. }
            | RpcFailure::ObjectNotExist
            | RpcFailure::TwowayOnly { .. }
            | RpcFailure::ModeMismatch { .. }
            | RpcFailure::Protocol(_)
            | RpcFailure::Decode(_) => FailureClass::Permanent,
        }
    }

    /// Whether the request may have reached the remote side before the
    /// failure occurred.
    pub fn request_sent(&self) -> bool {
        match self {
            RpcFailure::ConnectionLost { request_sent, .. }
            | RpcFailure::Timeout { request_sent } => *request_sent,
            RpcFailure::ConnectionRefused { .. } | RpcFailure::Overloaded { .. } => false,
            _ => true,
        }
    }

    /// Convenience constructor for a user error carrying a UTF-8 message.
    pub fn user_error(message: impl Into<String>) -> Self {
        RpcFailure::UserError {
            payload: message.into().into_bytes(),
        }
    }
}

impl fmt::Display for RpcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcFailure::ConnectionRefused { reason } => write!(f, "connection refused: {reason}"),
            RpcFailure::ConnectionLost {
                request_sent,
                reason,
            } => write!(
                f,
                "connection lost ({}): {reason}",
                if *request_sent {
                    "request sent"
                } else {
                    "request not sent"
                }
            ),
            RpcFailure::Timeout { request_sent } => write!(
                f,
                "timed out ({})",
                if *request_sent {
                    "request sent"
                } else {
                    "request not sent"
                }
            ),
            RpcFailure::Overloaded { reason } => write!(f, "endpoint overloaded: {reason}"),
            RpcFailure::UserError { payload } => match std::str::from_utf8(payload) {
                Ok(message) => write!(f, "remote operation failed: {message}"),
                Err(_) => write!(f, "remote operation failed with payload: {payload:?}"),
            },
            RpcFailure::OperationNotExist { operation } => {
                write!(f, "operation does not exist: {operation}")
            }
            RpcFailure::FacetNotExist { facet } => write!(f, "facet does not exist: {facet}"),
            RpcFailure::ObjectNotExist => write!(f, "object does not exist"),
            RpcFailure::TwowayOnly { operation } => {
                write!(f, "operation {operation} can only be invoked two-way")
            }
            RpcFailure::ModeMismatch { operation } => {
                write!(f, "operation mode mismatch for {operation}")
            }
            RpcFailure::Protocol(msg) => write!(f, "protocol error: {msg}"),
            RpcFailure::Decode(msg) => write!(f, "decode error: {msg}"),
            RpcFailure::System(msg) => write!(f, "remote system error: {msg}"),
        }
    }
}

impl std::error::Error for RpcFailure {}
