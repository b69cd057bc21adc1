use std::fmt;
use tenacio::RpcFailure;

#[derive(Debug)]
pub enum RpcServiceEndpointError {
    /// The incoming bytes were not a valid request.
    Decode(RpcFailure),
    /// A handler could not be registered.
    Registration(String),
}

impl fmt::Display for RpcServiceEndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcServiceEndpointError::Decode(e) => write!(f, "failed to decode request: {}", e),
            RpcServiceEndpointError::Registration(msg) => write!(f, "registration failed: {}", msg),
        }
    }
}

impl std::error::Error for RpcServiceEndpointError {}

// Allows `?` to convert a request decode failure
impl From<RpcFailure> for RpcServiceEndpointError {
    fn from(err: RpcFailure) -> Self {
        RpcServiceEndpointError::Decode(err)
    }
}

/// Returned by a handler to report a declared error to the caller.
///
/// The payload is delivered as-is and surfaces on the client as an
/// application failure. Any other handler error is reported as a remote
/// system error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerPayloadError(pub Vec<u8>);

impl HandlerPayloadError {
    pub fn message(message: impl Into<String>) -> Self {
        HandlerPayloadError(message.into().into_bytes())
    }
}

impl fmt::Display for HandlerPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl std::error::Error for HandlerPayloadError {}
