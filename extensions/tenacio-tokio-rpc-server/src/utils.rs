use std::io::Result;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

/// Binds a listener to an OS-assigned port on `127.0.0.1` and returns it
/// together with that port.
pub async fn bind_tcp_listener_on_random_port() -> Result<(TcpListener, u16)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    Ok((listener, port))
}

/// The local address a listener is bound to, split into host and port.
pub fn tcp_listener_to_host_port(listener: &TcpListener) -> Result<(IpAddr, u16)> {
    let local: SocketAddr = listener.local_addr()?;

    Ok((local.ip(), local.port()))
}

/// The client URL for a server listening on `listener`.
pub fn tcp_listener_to_ws_url(listener: &TcpListener) -> Result<String> {
    let (host, port) = tcp_listener_to_host_port(listener)?;

    Ok(format!("ws://{host}:{port}/ws"))
}
