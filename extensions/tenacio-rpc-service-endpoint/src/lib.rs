mod endpoint;
pub use endpoint::*;

mod endpoint_interface;
pub use endpoint_interface::*;

pub mod error;

mod handler_table;
pub use handler_table::*;

mod with_handlers_trait;
pub use with_handlers_trait::*;
