//! Integration tests for the socket clients
//!
//! Each test binds a local WebSocket listener that plays the server side of
//! the protocol by hand, then drives the client against it:
//! - Socket.IO handshake, heartbeat, events and binary frames
//! - Socket.IO namespace rejection
//! - Channels JSON messages and base64 media

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message, WebSocketStream};

use framecast_signaling::{
    ChannelsClient, EventTransport, InboundEvent, OutboundEvent, SignalingError, SocketIoClient,
};

const OPEN_PACKET: &str =
    r#"0{"sid":"engine-1","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;
const FRAME_HEADER: &str = r#"451-["video_chunk",{"frame":{"_placeholder":true,"num":0}}]"#;

async fn start_listener() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

async fn accept(listener: TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn recv(ws: &mut WebSocketStream<TcpStream>) -> Message {
    timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for client message")
        .expect("client hung up")
        .expect("websocket error")
}

async fn next<T: EventTransport>(client: &mut T) -> Option<Result<InboundEvent, SignalingError>> {
    timeout(Duration::from_secs(5), client.next_event())
        .await
        .expect("timed out waiting for event")
}

#[tokio::test]
async fn test_socket_io_session() {
    let (listener, addr) = start_listener().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(listener).await;

        ws.send(Message::Text(OPEN_PACKET.to_string())).await.unwrap();
        assert_eq!(recv(&mut ws).await, Message::Text("40".to_string()));

        ws.send(Message::Text(r#"40{"sid":"socket-1"}"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::Text("2".to_string())).await.unwrap();
        ws.send(Message::Text(
            r#"42["connection_established",{"message":"Connected"}]"#.to_string(),
        ))
        .await
        .unwrap();

        // heartbeat answered before anything else
        assert_eq!(recv(&mut ws).await, Message::Text("3".to_string()));

        // one frame: header packet then the raw attachment
        assert_eq!(recv(&mut ws).await, Message::Text(FRAME_HEADER.to_string()));
        assert_eq!(
            recv(&mut ws).await,
            Message::Binary(vec![0xFF, 0xD8, 0xFF, 0xD9])
        );

        ws.send(Message::Text(FRAME_HEADER.to_string())).await.unwrap();
        ws.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
        ws.send(Message::Text("41".to_string())).await.unwrap();
        let _ = ws.close(None).await;
    });

    let mut client = timeout(
        Duration::from_secs(5),
        SocketIoClient::connect(&format!("ws://{}", addr)),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(client.handshake().sid, "engine-1");

    match next(&mut client).await {
        Some(Ok(InboundEvent::Connected { sid })) => assert_eq!(sid.as_deref(), Some("socket-1")),
        other => panic!("expected connect ack, got {:?}", other),
    }

    match next(&mut client).await {
        Some(Ok(InboundEvent::ConnectionEstablished { message })) => {
            assert_eq!(message, "Connected")
        }
        other => panic!("expected greeting, got {:?}", other),
    }

    client
        .emit(OutboundEvent::VideoChunk {
            frame: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]),
        })
        .await
        .unwrap();

    match next(&mut client).await {
        Some(Ok(InboundEvent::VideoChunk { data, attachments })) => {
            assert_eq!(data["frame"]["_placeholder"], Value::Bool(true));
            assert_eq!(attachments, vec![Bytes::from_static(&[1, 2, 3])]);
        }
        other => panic!("expected video chunk, got {:?}", other),
    }

    assert!(matches!(
        next(&mut client).await,
        Some(Ok(InboundEvent::Disconnected { .. }))
    ));
    assert!(next(&mut client).await.is_none());
    assert!(client.is_closed());

    let err = client
        .emit(OutboundEvent::VideoChunk {
            frame: Bytes::from_static(b"late"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SignalingError::Closed));

    server.await.unwrap();
}

#[tokio::test]
async fn test_socket_io_connect_rejected() {
    let (listener, addr) = start_listener().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(listener).await;
        ws.send(Message::Text(OPEN_PACKET.to_string())).await.unwrap();
        assert_eq!(recv(&mut ws).await, Message::Text("40".to_string()));
        ws.send(Message::Text(r#"44{"message":"Not authorized"}"#.to_string()))
            .await
            .unwrap();
    });

    let mut client = SocketIoClient::connect(&format!("http://{}", addr))
        .await
        .unwrap();

    match next(&mut client).await {
        Some(Err(SignalingError::ConnectRejected { message })) => {
            assert_eq!(message, "Not authorized")
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert!(next(&mut client).await.is_none());

    server.await.unwrap();
}

#[tokio::test]
async fn test_socket_io_rejects_oversized_attachment_count() {
    let (listener, addr) = start_listener().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(listener).await;
        ws.send(Message::Text(OPEN_PACKET.to_string())).await.unwrap();
        assert_eq!(recv(&mut ws).await, Message::Text("40".to_string()));
        ws.send(Message::Text(r#"40{"sid":"socket-1"}"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::Text(
            r#"4518446744073709551615-["video_chunk",{}]"#.to_string(),
        ))
        .await
        .unwrap();
        ws.send(Message::Text(
            r#"42["connection_established",{"message":"still here"}]"#.to_string(),
        ))
        .await
        .unwrap();
        ws
    });

    let mut client = SocketIoClient::connect(&format!("http://{}", addr))
        .await
        .unwrap();

    assert!(matches!(
        next(&mut client).await,
        Some(Ok(InboundEvent::Connected { .. }))
    ));
    assert!(matches!(
        next(&mut client).await,
        Some(Err(SignalingError::InvalidPacket { .. }))
    ));
    match next(&mut client).await {
        Some(Ok(InboundEvent::ConnectionEstablished { message })) => {
            assert_eq!(message, "still here")
        }
        other => panic!("expected connection_established, got {:?}", other),
    }

    drop(server.await.unwrap());
}

#[tokio::test]
async fn test_socket_io_requires_open_packet() {
    let (listener, addr) = start_listener().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(listener).await;
        ws.send(Message::Text("40".to_string())).await.unwrap();
    });

    let err = SocketIoClient::connect(&format!("ws://{}", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, SignalingError::Handshake { .. }));

    server.await.unwrap();
}

#[tokio::test]
async fn test_channels_session() {
    let (listener, addr) = start_listener().await;

    let server = tokio::spawn(async move {
        let mut ws = accept(listener).await;

        ws.send(Message::Text(
            r#"{"type":"connection_established","message":"Connected to session 42"}"#.to_string(),
        ))
        .await
        .unwrap();

        let media = match recv(&mut ws).await {
            Message::Text(text) => serde_json::from_str::<Value>(&text).unwrap(),
            other => panic!("expected text frame, got {:?}", other),
        };
        assert_eq!(media["type"], "media");
        let decoded = STANDARD.decode(media["data"].as_str().unwrap()).unwrap();
        assert_eq!(decoded, vec![0xFF, 0xD8, 0xFF, 0xD9]);

        ws.send(Message::Text(
            r#"{"status":"received","session_id":"42","chunk_number":1}"#.to_string(),
        ))
        .await
        .unwrap();
        let _ = ws.close(None).await;
    });

    let url = format!("ws://{}/ws/socket_server/", addr);
    let mut client = ChannelsClient::connect(&url, Some("42")).await.unwrap();

    match next(&mut client).await {
        Some(Ok(InboundEvent::Connected { sid })) => assert_eq!(sid.as_deref(), Some("42")),
        other => panic!("expected connect, got {:?}", other),
    }
    match next(&mut client).await {
        Some(Ok(InboundEvent::ConnectionEstablished { message })) => {
            assert_eq!(message, "Connected to session 42")
        }
        other => panic!("expected greeting, got {:?}", other),
    }

    client
        .emit(OutboundEvent::VideoChunk {
            frame: Bytes::from_static(&[0xFF, 0xD8, 0xFF, 0xD9]),
        })
        .await
        .unwrap();

    match next(&mut client).await {
        Some(Ok(InboundEvent::Message { name, data })) => {
            assert_eq!(name, "message");
            assert_eq!(data["chunk_number"], 1);
        }
        other => panic!("expected status message, got {:?}", other),
    }

    assert!(matches!(
        next(&mut client).await,
        Some(Ok(InboundEvent::Disconnected { .. }))
    ));
    assert!(next(&mut client).await.is_none());

    server.await.unwrap();
}
