mod caller_interface;
pub use caller_interface::*;

pub mod error;

mod operation_call;
pub use operation_call::RpcCallOperation;

mod service_proxy;
pub use service_proxy::ServiceProxy;
