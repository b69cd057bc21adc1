//! Note: This `RpcServer` does not include authentication or authorization
//! mechanisms. It is meant for trusted, internal network communication. Any
//! struct that owns an [`RpcServiceEndpoint`] can act as a server; this one
//! accepts WebSocket connections using the Axum web framework and treats
//! every binary frame as one request.

use crate::ServerConfig;
use axum::{
    Router,
    extract::ConnectInfo,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tenacio_rpc_service_endpoint::{RpcServiceEndpoint, RpcServiceEndpointInterface};
use tokio::{
    net::{TcpListener, ToSocketAddrs},
    sync::{mpsc, watch},
    time::Instant,
};

/// Handlers see the peer address of the connection a request came in on.
pub type ConnectionContext = SocketAddr;

/// Stops a running [`RpcServer`] and closes every connection it holds.
#[derive(Clone)]
pub struct ServerShutdown {
    signal: Arc<watch::Sender<bool>>,
}

impl ServerShutdown {
    pub fn shutdown(&self) {
        self.signal.send_replace(true);
    }
}

/// An RPC server that listens for WebSocket connections and handles RPC calls.
pub struct RpcServer {
    endpoint: Arc<RpcServiceEndpoint<ConnectionContext>>,
    config: ServerConfig,
    shutdown: Arc<watch::Sender<bool>>,
}

impl Default for RpcServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl RpcServer {
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        RpcServer {
            endpoint: Arc::new(RpcServiceEndpoint::new()),
            config,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Returns an `Arc` clone of the underlying RPC service endpoint.
    /// This allows for registering handlers without tying the registration
    /// logic to the server implementation.
    pub fn endpoint(&self) -> Arc<RpcServiceEndpoint<ConnectionContext>> {
        self.endpoint.clone()
    }

    pub fn config(&self) -> ServerConfig {
        self.config
    }

    pub fn shutdown_handle(&self) -> ServerShutdown {
        ServerShutdown {
            signal: self.shutdown.clone(),
        }
    }

    /// Binds to an address and starts the RPC server.
    ///
    /// The address can be any type that implements `ToSocketAddrs`, such as
    /// a string "127.0.0.1:8080" or a `SocketAddr`.
    pub async fn serve<A: ToSocketAddrs>(self, addr: A) -> Result<SocketAddr, axum::BoxError> {
        let listener = TcpListener::bind(addr).await?;
        let server = Arc::new(self);
        server.serve_with_listener(listener).await
    }

    /// Starts the RPC server on a specific host and port.
    pub async fn serve_on(self, host: &str, port: u16) -> Result<SocketAddr, axum::BoxError> {
        let addr = format!("{host}:{port}");
        self.serve(addr).await
    }

    /// Starts the RPC server with a pre-bound `TcpListener`.
    ///
    /// Returns once [`ServerShutdown::shutdown`] has been called.
    pub async fn serve_with_listener(
        self: Arc<Self>,
        listener: TcpListener,
    ) -> Result<SocketAddr, axum::BoxError> {
        let address = listener.local_addr()?;
        let app = Router::new().route(
            "/ws",
            get({
                let server = self.clone();
                move |ws, conn| Self::ws_handler(ws, conn, server)
            }),
        );
        let mut shutdown = self.shutdown.subscribe();
        tracing::info!("Server running on {:?}", address);
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stopped| *stopped).await;
        })
        .await?;
        tracing::info!("Server on {:?} stopped", address);
        Ok(address)
    }

    async fn ws_handler(
        ws: WebSocketUpgrade,
        ConnectInfo(addr): ConnectInfo<SocketAddr>,
        server: Arc<RpcServer>,
    ) -> impl IntoResponse {
        tracing::info!("Client connected: {}", addr);
        ws.on_upgrade(move |socket| server.handle_socket(socket, addr))
    }

    async fn handle_socket(self: Arc<Self>, socket: WebSocket, addr: SocketAddr) {
        let (sender, receiver) = socket.split();
        let (tx, rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(Self::sender_task(sender, rx));

        tokio::spawn(Self::receiver_task(
            self.endpoint.clone(),
            self.config,
            self.shutdown.subscribe(),
            receiver,
            tx,
            addr,
        ));
    }

    /// Forwards replies and pings to the client until every sender is gone
    /// or the client disconnects.
    async fn sender_task(
        mut sender: SplitSink<WebSocket, Message>,
        mut rx: mpsc::UnboundedReceiver<Message>,
    ) {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    }

    /// Handles all inbound traffic from one client.
    ///
    /// Pings the client every `heartbeat_interval`, disconnects it once it
    /// has been silent for `client_timeout`, and dispatches each binary frame on its
    /// own task so slow handlers do not hold up the connection.
    async fn receiver_task(
        endpoint: Arc<RpcServiceEndpoint<ConnectionContext>>,
        config: ServerConfig,
        mut shutdown: watch::Receiver<bool>,
        mut receiver: SplitStream<WebSocket>,
        tx: mpsc::UnboundedSender<Message>,
        addr: SocketAddr,
    ) {
        let mut heartbeat = tokio::time::interval(config.heartbeat_interval);
        // The first tick completes immediately.
        heartbeat.tick().await;
        let mut last_seen = Instant::now();

        loop {
            tokio::select! {
                _ = shutdown.wait_for(|stopped| *stopped) => {
                    tracing::info!("Closing connection to {} for shutdown.", addr);
                    let _ = tx.send(Message::Close(None));
                    break;
                }

                _ = heartbeat.tick() => {
                    if last_seen.elapsed() >= config.client_timeout {
                        tracing::warn!("Client {} timed out. Closing connection.", addr);
                        break;
                    }
                    if tx.send(Message::Ping(Bytes::new())).is_err() {
                        tracing::info!("Client {} disconnected (failed to send ping).", addr);
                        break;
                    }
                }

                frame = receiver.next() => {
                    last_seen = Instant::now();
                    match frame {
                        Some(Ok(Message::Binary(bytes))) => {
                            let endpoint = endpoint.clone();
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                match endpoint.read_bytes(addr, &bytes).await {
                                    Ok(Some(reply)) => {
                                        let _ = tx.send(Message::Binary(Bytes::from(reply)));
                                    }
                                    Ok(None) => {}
                                    Err(err) => {
                                        tracing::error!("Error processing bytes from {}: {}", addr, err);
                                    }
                                }
                            });
                        }
                        Some(Ok(Message::Pong(_))) => {
                            tracing::trace!("Received pong from {}", addr);
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("Client {} initiated close.", addr);
                            break;
                        }
                        // Text and Ping are ignored; axum answers pings itself.
                        Some(Ok(_)) => {}
                        None | Some(Err(_)) => {
                            tracing::info!("Client {} disconnected.", addr);
                            break;
                        }
                    }
                }
            }
        }
        tracing::info!("Terminated connection for {}.", addr);
    }
}
