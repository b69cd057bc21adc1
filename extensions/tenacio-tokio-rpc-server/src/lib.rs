mod rpc_server;
pub use rpc_server::*;

mod server_config;
pub use server_config::ServerConfig;

pub mod utils;
