use std::fmt;
use std::io;
use tenacio::{InvokeError, InvokeErrorKind};

/// Represents errors that can occur during an RPC call from the perspective of the caller.
#[derive(Debug)]
pub enum RpcCallerError {
    /// The arguments could not be encoded; nothing was sent.
    Encode(io::Error),
    /// The call ended with a terminal invocation error.
    Invoke(InvokeError),
    /// The call succeeded but its result could not be decoded.
    Decode(io::Error),
}

impl RpcCallerError {
    /// The kind of the terminal invocation error, if the call got that far.
    pub fn invoke_kind(&self) -> Option<InvokeErrorKind> {
        match self {
            RpcCallerError::Invoke(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl fmt::Display for RpcCallerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcCallerError::Encode(e) => write!(f, "failed to encode arguments: {}", e),
            RpcCallerError::Invoke(e) => write!(f, "{}", e),
            RpcCallerError::Decode(e) => write!(f, "failed to decode result: {}", e),
        }
    }
}

impl std::error::Error for RpcCallerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcCallerError::Encode(e) | RpcCallerError::Decode(e) => Some(e),
            RpcCallerError::Invoke(e) => Some(e),
        }
    }
}

impl From<InvokeError> for RpcCallerError {
    fn from(e: InvokeError) -> Self {
        RpcCallerError::Invoke(e)
    }
}
