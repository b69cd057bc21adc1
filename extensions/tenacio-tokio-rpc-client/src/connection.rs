use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tenacio::RpcFailure;
use tenacio_rpc_service::{ReplyEnvelope, RequestEnvelope};
use tokio::sync::{
    Mutex,
    mpsc::{self, unbounded_channel},
    oneshot,
};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message as WsMessage},
};

type PendingReplies = Arc<Mutex<HashMap<u32, oneshot::Sender<ReplyEnvelope>>>>;

/// One established WebSocket connection, shared by every call that uses it.
///
/// Cloning is cheap. The socket is closed once the last clone is dropped or
/// the server goes away; either way every outstanding call is released.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    tx: mpsc::UnboundedSender<WsMessage>,
    pending: PendingReplies,
    closed: Arc<AtomicBool>,
    receive_task: JoinHandle<()>,
}

impl Drop for ConnectionInner {
    fn drop(&mut self) {
        // The send loop ends on its own once `tx` is gone.
        self.receive_task.abort();
    }
}

impl Connection {
    /// Opens a connection to `url`, failing if the handshake does not finish
    /// within `connect_timeout`.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Connection, RpcFailure> {
        let (ws_stream, _) = tokio::time::timeout(connect_timeout, connect_async(url))
            .await
            .map_err(|_| RpcFailure::Timeout {
                request_sent: false,
            })?
            .map_err(map_connect_error)?;
        let (mut sender, mut receiver) = ws_stream.split();

        let (tx, mut rx) = unbounded_channel::<WsMessage>();
        let pending: PendingReplies = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        // Send loop
        let send_closed = closed.clone();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if sender.send(msg).await.is_err() {
                    send_closed.store(true, Ordering::SeqCst);
                    break;
                }
            }
            let _ = sender.close().await;
        });

        // Receive loop
        let receive_pending = pending.clone();
        let receive_closed = closed.clone();
        let receive_task = tokio::spawn(async move {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(WsMessage::Binary(bytes)) => match ReplyEnvelope::decode(&bytes) {
                        Ok(reply) => {
                            let waiter = receive_pending.lock().await.remove(&reply.request_id);
                            match waiter {
                                Some(waiter) => {
                                    let _ = waiter.send(reply);
                                }
                                None => tracing::debug!(
                                    request_id = reply.request_id,
                                    "reply for unknown request"
                                ),
                            }
                        }
                        Err(err) => tracing::warn!("dropping undecodable reply: {}", err),
                    },
                    Ok(WsMessage::Close(_)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            // Mark closed before draining so no new waiter is stranded.
            receive_closed.store(true, Ordering::SeqCst);
            receive_pending.lock().await.clear();
            tracing::debug!("connection closed");
        });

        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                tx,
                pending,
                closed,
                receive_task,
            }),
        })
    }

    pub fn is_open(&self) -> bool {
        !self.inner.closed.load(Ordering::SeqCst)
    }

    /// Whether both handles refer to the same underlying connection.
    pub fn same_as(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Queues `request` for sending.
    ///
    /// For a two-way request the returned receiver resolves with the reply,
    /// or errors if the connection closes first. One-way requests return
    /// `None` as soon as they are queued.
    pub async fn send_request(
        &self,
        request: &RequestEnvelope,
    ) -> Result<Option<oneshot::Receiver<ReplyEnvelope>>, RpcFailure> {
        let lost = || RpcFailure::ConnectionLost {
            request_sent: false,
            reason: "connection closed".into(),
        };

        let waiter = if request.is_one_way() {
            if !self.is_open() {
                return Err(lost());
            }
            None
        } else {
            let (reply_tx, reply_rx) = oneshot::channel();
            let mut pending = self.inner.pending.lock().await;
            if !self.is_open() {
                return Err(lost());
            }
            pending.insert(request.request_id, reply_tx);
            Some(reply_rx)
        };

        if self
            .inner
            .tx
            .send(WsMessage::Binary(Bytes::from(request.encode())))
            .is_err()
        {
            self.forget(request.request_id).await;
            return Err(lost());
        }

        Ok(waiter)
    }

    /// Drops the waiter for `request_id`, e.g. after a timeout.
    pub async fn forget(&self, request_id: u32) {
        self.inner.pending.lock().await.remove(&request_id);
    }

    /// Stops using this connection for new requests.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let _ = self.inner.tx.send(WsMessage::Close(None));
    }
}

fn map_connect_error(err: WsError) -> RpcFailure {
    match err {
        WsError::Url(e) => RpcFailure::Protocol(format!("invalid server url: {e}")),
        other => RpcFailure::ConnectionRefused {
            reason: other.to_string(),
        },
    }
}
