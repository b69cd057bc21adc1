use example_tenacio_rpc_service_definition::format_reader::{GetSizeX, SetId};
use futures_util::{SinkExt, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tenacio::Context;
use tenacio_rpc_service::{ReplyEnvelope, RequestEnvelope, RpcOperation, RpcResultStatus};
use tenacio_rpc_service_endpoint::{RpcServiceEndpointInterface, error::HandlerPayloadError};
use tenacio_tokio_rpc_server::{
    RpcServer, ServerConfig, ServerShutdown,
    utils::{bind_tcp_listener_on_random_port, tcp_listener_to_ws_url},
};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

async fn start_server(config: ServerConfig) -> (String, ServerShutdown, JoinHandle<()>) {
    let (listener, _port) = bind_tcp_listener_on_random_port().await.unwrap();
    let url = tcp_listener_to_ws_url(&listener).unwrap();
    let server = RpcServer::new(config);
    let endpoint = server.endpoint();
    endpoint
        .register_operation::<GetSizeX, _, _>(|_, (), _| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(512)
        })
        .await
        .unwrap();
    endpoint
        .register_operation::<SetId, _, _>(|_, id: String, _| async move {
            if id.starts_with("bad/") {
                Err(HandlerPayloadError::message("file not found").into())
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();
    let shutdown = server.shutdown_handle();
    let handle = tokio::spawn(async move {
        let _ = Arc::new(server).serve_with_listener(listener).await;
    });
    (url, shutdown, handle)
}

fn request<Op: RpcOperation>(request_id: u32, input: Op::Input) -> Message {
    let call = Op::call_descriptor(input).unwrap();
    let envelope = RequestEnvelope::from_call(request_id, &call, &Context::empty());
    Message::Binary(envelope.encode().into())
}

async fn next_reply<S>(stream: &mut S) -> ReplyEnvelope
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        match stream.next().await.unwrap().unwrap() {
            Message::Binary(bytes) => return ReplyEnvelope::decode(&bytes).unwrap(),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn test_requests_are_answered_by_id() {
    let (url, shutdown, _handle) = start_server(ServerConfig::default()).await;
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    let (mut sink, mut stream) = ws.split();

    // The slow request goes first; replies come back in completion order.
    sink.send(request::<GetSizeX>(1, ())).await.unwrap();
    sink.send(request::<SetId>(2, "bad/path".into())).await.unwrap();

    let first = next_reply(&mut stream).await;
    let second = next_reply(&mut stream).await;

    assert_eq!(first.request_id, 2);
    assert_eq!(first.status().unwrap(), RpcResultStatus::UserError);
    assert_eq!(second.request_id, 1);
    assert_eq!(GetSizeX::decode_response(&second.payload).unwrap(), 512);

    shutdown.shutdown();
}

#[tokio::test]
async fn test_malformed_frame_does_not_close_connection() {
    let (url, shutdown, _handle) = start_server(ServerConfig::default()).await;
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    let (mut sink, mut stream) = ws.split();

    sink.send(Message::Binary(vec![0xde, 0xad].into())).await.unwrap();
    sink.send(request::<GetSizeX>(3, ())).await.unwrap();

    let reply = next_reply(&mut stream).await;
    assert_eq!(reply.request_id, 3);

    shutdown.shutdown();
}

#[tokio::test]
async fn test_shutdown_closes_connections() {
    let (url, shutdown, handle) = start_server(ServerConfig::default()).await;
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    let (_sink, mut stream) = ws.split();

    shutdown.shutdown();

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "connection should close on shutdown");
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop")
        .unwrap();
    assert!(connect_async(url.as_str()).await.is_err());
}

#[tokio::test]
async fn test_silent_client_is_disconnected() {
    let config = ServerConfig {
        heartbeat_interval: Duration::from_millis(50),
        client_timeout: Duration::from_millis(200),
    };
    let (url, shutdown, _handle) = start_server(config).await;
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    let (_sink, mut stream) = ws.split();

    // Never read from the socket until the server gives up, so no pongs are
    // sent back.
    tokio::time::sleep(Duration::from_millis(600)).await;

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok());

    shutdown.shutdown();
}
