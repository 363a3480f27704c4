//! End-to-end endpoint scenarios over in-memory duplex streams.

use futures::FutureExt;
use tokio::io::{duplex, AsyncWriteExt};

use wsframe::codec::FrameReader;
use wsframe::{upgrade, CloseCode, Config, Error, Frame, Message, OpCode, Role, WebSocket};

/// Handshake negotiation picks the first client preference the server
/// accepts, and both sides observe the same name.
#[tokio::test]
async fn handshake_negotiates_first_client_preference() {
    let (client_io, server_io) = duplex(4096);

    let server_config = Config::default().with_subprotocols(["superchat", "chat"]);
    let server_task = tokio::spawn(async move {
        upgrade::accept(server_io, server_config).await.unwrap()
    });

    let client_config = Config::default().with_subprotocols(["chat", "superchat"]);
    let client = upgrade::connect(client_io, "server.example.com", "/chat", client_config)
        .await
        .unwrap();
    let server = server_task.await.unwrap();

    assert_eq!(client.subprotocol(), Some("chat"));
    assert_eq!(server.subprotocol(), Some("chat"));
}

/// A guarded echo server returns the message unchanged.
#[tokio::test]
async fn text_echo_roundtrip() {
    let (client_io, server_io) = duplex(4096);

    let server_task = tokio::spawn(async move {
        upgrade::serve(server_io, Config::default(), |ws: &mut WebSocket<_>| {
            async move {
                while let Some(msg) = ws.recv().await? {
                    if msg.is_close() {
                        break;
                    }
                    ws.send(msg).await?;
                }
                Ok(())
            }
            .boxed()
        })
        .await
    });

    let mut client = upgrade::connect(client_io, "example.com", "/", Config::default())
        .await
        .unwrap();

    client.send(Message::text("Hello World!")).await.unwrap();
    let echoed = client.recv().await.unwrap().unwrap();
    assert!(matches!(echoed, Message::Text(ref s) if s == "Hello World!"));

    client.close(CloseCode::Normal, "").await.unwrap();
    server_task.await.unwrap().unwrap();
}

/// A 10-byte message at fragment size 3 crosses the wire as four frames
/// (3/3/3/1) with the RFC opcode/FIN pattern.
#[tokio::test]
async fn fragmented_binary_wire_shape() {
    let (client_io, peer) = duplex(4096);
    let client = WebSocket::new(
        client_io,
        Role::Client,
        Config::default().with_fragment_size(3),
    );

    let payload: Vec<u8> = (0u8..10).collect();
    client.send(Message::binary(payload.clone())).await.unwrap();

    let mut probe = FrameReader::new(peer, Role::Server, &Config::default());

    let f1 = probe.read_frame().await.unwrap();
    assert!(!f1.fin);
    assert_eq!(f1.opcode, OpCode::Binary);
    assert_eq!(f1.payload().len(), 3);

    let f2 = probe.read_frame().await.unwrap();
    assert!(!f2.fin);
    assert_eq!(f2.opcode, OpCode::Continuation);
    assert_eq!(f2.payload().len(), 3);

    let f3 = probe.read_frame().await.unwrap();
    assert!(!f3.fin);
    assert_eq!(f3.opcode, OpCode::Continuation);
    assert_eq!(f3.payload().len(), 3);

    let f4 = probe.read_frame().await.unwrap();
    assert!(f4.fin);
    assert_eq!(f4.opcode, OpCode::Continuation);
    assert_eq!(f4.payload().len(), 1);

    let mut rebuilt = Vec::new();
    for frame in [f1, f2, f3, f4] {
        rebuilt.extend_from_slice(frame.payload());
    }
    assert_eq!(rebuilt, payload);
}

/// The receiver reconstructs the message bytewise identically regardless
/// of the sender's fragment size.
#[tokio::test]
async fn fragmentation_is_transparent() {
    let payload: Vec<u8> = (0u8..=255).cycle().take(1000).collect();

    for fragment_size in [1, 3, 64, 999, 1000, 4096] {
        let (client_io, server_io) = duplex(16384);
        let client = WebSocket::new(
            client_io,
            Role::Client,
            Config::default().with_fragment_size(fragment_size),
        );
        let mut server = WebSocket::new(server_io, Role::Server, Config::default());

        client.send(Message::binary(payload.clone())).await.unwrap();

        let msg = server.recv().await.unwrap().unwrap();
        assert_eq!(
            msg.into_binary().unwrap(),
            payload,
            "fragment_size={fragment_size}"
        );
    }
}

/// A ping interleaved in a fragmented message is answered with a pong and
/// the message still reassembles.
#[tokio::test]
async fn ping_interleaved_in_fragmented_message() {
    let (server_io, mut peer) = duplex(4096);
    let mut server = WebSocket::new(server_io, Role::Server, Config::default());

    // Client frames, masked the way a client would send them:
    // [text "AB" fin=0] [ping "x"] [continuation "CD" fin=1]
    let key = [0x11, 0x22, 0x33, 0x44];
    let mut wire = Vec::new();
    for frame in [
        Frame::new(false, OpCode::Text, b"AB".to_vec()),
        Frame::ping(b"x".to_vec()),
        Frame::new(true, OpCode::Continuation, b"CD".to_vec()),
    ] {
        let mut buf = vec![0u8; frame.wire_size(true)];
        let n = frame.write(&mut buf, Some(key)).unwrap();
        wire.extend_from_slice(&buf[..n]);
    }
    peer.write_all(&wire).await.unwrap();

    // The application sees exactly one text message "ABCD".
    let msg = server.recv().await.unwrap().unwrap();
    assert!(matches!(msg, Message::Text(ref s) if s == "ABCD"));

    // The pong reply carries the ping payload.
    let mut probe = FrameReader::new(peer, Role::Client, &Config::default());
    let pong = probe.read_frame().await.unwrap();
    assert_eq!(pong.opcode, OpCode::Pong);
    assert_eq!(pong.payload(), b"x");
}

/// Client-initiated close: the server sees the code and reason, echoes,
/// and the client's closing handshake completes without an
/// unexpected-message error.
#[tokio::test]
async fn close_with_code_completes_both_sides() {
    let (client_io, server_io) = duplex(4096);
    let mut client = WebSocket::new(client_io, Role::Client, Config::default());
    let mut server = WebSocket::new(server_io, Role::Server, Config::default());

    let server_task = tokio::spawn(async move {
        let msg = server.recv().await.unwrap().unwrap();
        match msg {
            Message::Close(Some(cf)) => {
                assert_eq!(cf.code, CloseCode::Normal);
                assert_eq!(cf.reason, "bye");
            }
            other => panic!("expected close, got {other:?}"),
        }
        server
    });

    client.close(CloseCode::Normal, "bye").await.unwrap();

    let server = server_task.await.unwrap();
    assert_eq!(server.state(), wsframe::EndpointState::Closed);
    assert_eq!(client.state(), wsframe::EndpointState::Closed);
}

/// Text payload `C3 28` is invalid UTF-8: the connection fails with close
/// code 1007 on the wire.
#[tokio::test]
async fn invalid_utf8_fails_with_1007() {
    let (server_io, mut peer) = duplex(4096);
    let mut server = WebSocket::new(server_io, Role::Server, Config::default());

    let frame = Frame::new(true, OpCode::Text, vec![0xc3, 0x28]);
    let mut buf = vec![0u8; frame.wire_size(true)];
    let n = frame.write(&mut buf, Some([0xaa, 0xbb, 0xcc, 0xdd])).unwrap();
    peer.write_all(&buf[..n]).await.unwrap();

    let result = server.recv().await;
    assert!(matches!(result, Err(Error::InvalidUtf8)));

    let mut probe = FrameReader::new(peer, Role::Client, &Config::default());
    let close = probe.read_frame().await.unwrap();
    assert_eq!(close.opcode, OpCode::Close);
    assert_eq!(&close.payload()[..2], &1007u16.to_be_bytes());
}

/// A peer that vanishes without a close frame is observable: the reader
/// gets a synthesized status-less close, unlike the completed handshake
/// which always carries a code.
#[tokio::test]
async fn abrupt_eof_is_distinguishable_from_close_handshake() {
    // Peer performs the closing handshake: close arrives with a code.
    let (client_io, server_io) = duplex(4096);
    let mut client = WebSocket::new(client_io, Role::Client, Config::default());
    let mut server = WebSocket::new(server_io, Role::Server, Config::default());

    let server_task = tokio::spawn(async move {
        while let Ok(Some(_)) = server.recv().await {}
    });
    client.close(CloseCode::Normal, "done").await.unwrap();
    server_task.await.unwrap();

    // Peer vanishes mid-connection: the close event carries no frame.
    let (client_io, server_io) = duplex(4096);
    let mut client = WebSocket::new(client_io, Role::Client, Config::default());
    drop(server_io);

    let msg = client.recv().await.unwrap().unwrap();
    assert!(matches!(msg, Message::Close(None)));
    assert!(client.recv().await.unwrap().is_none());
}

/// Closing twice is the same as closing once.
#[tokio::test]
async fn close_is_idempotent() {
    let (client_io, server_io) = duplex(4096);
    let mut client = WebSocket::new(client_io, Role::Client, Config::default());
    let mut server = WebSocket::new(server_io, Role::Server, Config::default());

    let server_task = tokio::spawn(async move {
        while let Ok(Some(_)) = server.recv().await {}
    });

    client.close(CloseCode::Normal, "done").await.unwrap();
    client.close(CloseCode::Normal, "done").await.unwrap();
    client.close(CloseCode::GoingAway, "again").await.unwrap();

    server_task.await.unwrap();
}

/// Concurrent senders on one endpoint never interleave fragments of
/// different messages; the receiver sees two whole messages.
#[tokio::test]
async fn concurrent_senders_serialize_messages() {
    let (client_io, server_io) = duplex(65536);
    let client = WebSocket::new(
        client_io,
        Role::Client,
        Config::default().with_fragment_size(16),
    );
    let mut server = WebSocket::new(server_io, Role::Server, Config::default());

    let sender_a = client.sender();
    let sender_b = client.sender();

    let a = tokio::spawn(async move { sender_a.send_binary(vec![0xAA; 256]).await });
    let b = tokio::spawn(async move { sender_b.send_binary(vec![0xBB; 256]).await });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let first = server.recv().await.unwrap().unwrap().into_binary().unwrap();
    let second = server.recv().await.unwrap().unwrap().into_binary().unwrap();

    for msg in [first, second] {
        assert_eq!(msg.len(), 256);
        let fill = msg[0];
        assert!(
            msg.iter().all(|&b| b == fill),
            "message bytes mixed across senders"
        );
    }
}

/// Streams pipelined right behind the upgrade response are not lost, and
/// a server that never negotiated a subprotocol reports none.
#[tokio::test]
async fn upgrade_then_immediate_traffic() {
    let (client_io, server_io) = duplex(4096);

    let server_task = tokio::spawn(async move {
        let mut ws = upgrade::accept(server_io, Config::default()).await.unwrap();
        let msg = ws.recv().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Text(ref s) if s == "first"));
        ws
    });

    let client = upgrade::connect(client_io, "example.com", "/", Config::default())
        .await
        .unwrap();
    client.send(Message::text("first")).await.unwrap();

    let server = server_task.await.unwrap();
    assert_eq!(server.subprotocol(), None);
}
