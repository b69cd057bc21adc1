mod client_config;
pub use client_config::ClientConfig;

mod connection;
pub use connection::Connection;

mod rpc_client;
pub use rpc_client::RpcClient;

mod ws_remote_service;
pub use ws_remote_service::WsRemoteService;

mod ws_transport;
pub use ws_transport::WsTransport;
