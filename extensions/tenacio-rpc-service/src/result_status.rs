use num_enum::{IntoPrimitive, TryFromPrimitive};
use tenacio::RpcFailure;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum RpcResultStatus {
    Success = 0,
    /// The handler raised a declared error; the payload carries it.
    UserError = 1,
    SystemError = 2,
    OperationNotExist = 3,
    FacetNotExist = 4,
    ObjectNotExist = 5,
    ModeMismatch = 6,
}

impl RpcResultStatus {
    /// Maps a non-success reply to the failure the caller sees.
    ///
    /// Returns `None` for `Success`.
    pub fn to_failure(self, operation: &str, facet: &str, payload: Vec<u8>) -> Option<RpcFailure> {
        let failure = match self {
            RpcResultStatus::Success => return None,
            RpcResultStatus::UserError => RpcFailure::UserError { payload },
            RpcResultStatus::SystemError => {
                RpcFailure::System(String::from_utf8_lossy(&payload).into_owned())
            }
            RpcResultStatus::OperationNotExist => RpcFailure::OperationNotExist {
                operation: operation.to_string(),
            },
            RpcResultStatus::FacetNotExist => RpcFailure::FacetNotExist {
                facet: facet.to_string(),
            },
            RpcResultStatus::ObjectNotExist => RpcFailure::ObjectNotExist,
            RpcResultStatus::ModeMismatch => RpcFailure::ModeMismatch {
                operation: operation.to_string(),
            },
        };
        Some(failure)
    }
}
