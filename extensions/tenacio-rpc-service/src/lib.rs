pub mod builtin;
pub mod codec;
pub mod constants;
pub use constants::*;
mod envelope;
pub use envelope::{ReplyEnvelope, RequestEnvelope};
mod macros;
pub use macros::*;
mod operation;
pub use operation::{RpcOperation, ServiceType};
mod result_status;
pub use result_status::RpcResultStatus;

pub use tenacio::OperationMode;
