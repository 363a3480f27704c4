//! The WebSocket endpoint: binds a frame reader and a shared sender over
//! the two halves of a byte stream, drives control-frame handling and the
//! closing handshake, and exposes the endpoint's properties.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tracing::debug;

use crate::codec::{FrameReader, FrameWriter};
use crate::config::Config;
use crate::connection::sender::{truncate_reason, MessageSender, Shared};
use crate::connection::{EndpointState, Role};
use crate::error::{Error, Result};
use crate::message::{CloseCode, CloseFrame, Message};
use crate::protocol::{AssembledMessage, MessageAssembler, OpCode};

/// A WebSocket endpoint over an async byte stream.
///
/// The endpoint owns the reading side; the writing side lives behind a
/// cloneable [`MessageSender`] so one reader and any number of writers can
/// share the connection (writers are serialized per message). `recv`
/// answers pings and echoes the peer's close automatically; `close` runs
/// the full closing handshake.
///
/// ## Example
///
/// ```rust,ignore
/// use wsframe::{Config, Message, Role, WebSocket};
///
/// let mut ws = WebSocket::new(stream, Role::Client, Config::default());
/// ws.send(Message::text("Hello")).await?;
/// while let Some(msg) = ws.recv().await? {
///     println!("received: {msg:?}");
/// }
/// ```
pub struct WebSocket<T> {
    reader: FrameReader<ReadHalf<T>>,
    sender: MessageSender<WriteHalf<T>>,
    assembler: MessageAssembler,
    shared: Arc<Shared>,
    role: Role,
    subprotocol: Option<String>,
    close_parent: bool,
    parent_closed: bool,
}

impl<T: AsyncRead + AsyncWrite> WebSocket<T> {
    /// Wrap an established stream as a WebSocket endpoint.
    ///
    /// The opening handshake is not performed here; use
    /// [`upgrade::accept`](crate::upgrade::accept) or
    /// [`upgrade::connect`](crate::upgrade::connect) for that, or call
    /// this directly on a stream whose handshake already completed.
    pub fn new(io: T, role: Role, config: Config) -> Self {
        let (read_half, write_half) = tokio::io::split(io);
        let shared = Arc::new(Shared::default());
        let reader = FrameReader::new(read_half, role, &config);
        let writer = FrameWriter::new(write_half, role, &config);
        let sender = MessageSender::new(writer, Arc::clone(&shared), config.fragment_size);

        Self {
            reader,
            sender,
            assembler: MessageAssembler::new(config.limits.clone()),
            shared,
            role,
            subprotocol: None,
            close_parent: config.close_parent,
            parent_closed: false,
        }
    }

    pub(crate) fn set_subprotocol(&mut self, subprotocol: Option<String>) {
        self.subprotocol = subprotocol;
    }
}

impl<T> WebSocket<T> {
    /// The endpoint role (client or server).
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The subprotocol negotiated during the handshake, if any.
    #[must_use]
    pub fn subprotocol(&self) -> Option<&str> {
        self.subprotocol.as_deref()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> EndpointState {
        self.shared.get()
    }

    /// Check if the endpoint is still open for data transfer.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.get() == EndpointState::Open
    }

    /// A cloneable handle for sending from other tasks.
    ///
    /// Concurrent senders are serialized at message granularity: once one
    /// begins a message, no other sender's frames interleave with it.
    #[must_use]
    pub fn sender(&self) -> MessageSender<WriteHalf<T>> {
        self.sender.clone()
    }
}

impl<T: AsyncRead + AsyncWrite> WebSocket<T> {
    /// Send a message on this endpoint.
    ///
    /// See [`MessageSender::send`] for semantics; this is the same path
    /// the sender handles use.
    pub async fn send(&self, message: Message) -> Result<()> {
        self.sender.send(message).await
    }

    /// Receive the next message.
    ///
    /// Handles, without surfacing to the caller:
    /// - ping frames (answered with a pong before any later application
    ///   send; delivered only if the pong cannot be written)
    /// - pong frames (discarded)
    /// - fragment reassembly
    ///
    /// The peer's close frame is delivered as `Message::Close(Some(..))`
    /// after being echoed (when we had not yet sent our own close). A
    /// stream that ends *without* a close frame is surfaced once as
    /// `Message::Close(None)`, so callers can tell a completed closing
    /// handshake from a peer that vanished. After either event, `recv`
    /// returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Protocol violations fail the connection: a best-effort close frame
    /// with the mapped code (1002/1007/1009) is sent, the state becomes
    /// `Closed`, and the error is returned. I/O errors also close the
    /// endpoint.
    pub async fn recv(&mut self) -> Result<Option<Message>> {
        if !self.shared.get().can_receive() {
            return Ok(None);
        }

        loop {
            let frame = match self.reader.read_frame().await {
                Ok(frame) => frame,
                Err(Error::ConnectionClosed(_)) => {
                    // Stream ended without a close frame; synthesize a
                    // status-less close so the caller sees the difference
                    // from a completed closing handshake.
                    self.assembler.reset();
                    self.shared.force_closed();
                    return Ok(Some(Message::Close(None)));
                }
                Err(e) => return Err(self.fail(e).await),
            };

            match frame.opcode {
                OpCode::Ping => {
                    let payload = frame.into_payload();
                    if self.sender.send_pong(payload.clone()).await.is_err() {
                        // Output closed; let the caller see the ping.
                        return Ok(Some(Message::Ping(payload)));
                    }
                }
                OpCode::Pong => {}
                OpCode::Close => {
                    let close_frame = match parse_close_payload(frame.payload()) {
                        Ok(cf) => cf,
                        Err(e) => return Err(self.fail(e).await),
                    };

                    let was_open = self.shared.get() == EndpointState::Open;
                    self.shared.close_received();

                    if was_open {
                        // Echo once, with the peer's code (1000 if none).
                        let code = close_frame
                            .as_ref()
                            .map_or(CloseCode::Normal, |cf| cf.code);
                        if let Err(e) = self.sender.send_close(code, "").await {
                            debug!(error = %e, "close echo failed");
                        }
                    }

                    debug!(state = %self.shared.get(), "close frame received");
                    let delivered = close_frame
                        .unwrap_or_else(|| CloseFrame::new(CloseCode::Normal, ""));
                    return Ok(Some(Message::Close(Some(delivered))));
                }
                OpCode::Text | OpCode::Binary | OpCode::Continuation => {
                    match self.assembler.push(frame) {
                        Ok(Some(assembled)) => {
                            return match assembled_to_message(assembled) {
                                Ok(message) => Ok(Some(message)),
                                Err(e) => Err(self.fail(e).await),
                            };
                        }
                        Ok(None) => {}
                        Err(e) => return Err(self.fail(e).await),
                    }
                }
            }
        }
    }

    /// Run the closing handshake.
    ///
    /// Sends a close frame unless one already went out, then drains
    /// incoming frames until the peer's close arrives: interleaved control
    /// frames are discarded, but a data frame fails with
    /// [`Error::UnexpectedMessage`]. End-of-stream during the drain counts
    /// as completion. With `close_parent` set (the default), the wrapped
    /// stream is shut down afterwards.
    ///
    /// Idempotent: closing an endpoint that is already `Closed` is a
    /// no-op.
    pub async fn close(&mut self, code: CloseCode, reason: &str) -> Result<()> {
        if self.shared.get() == EndpointState::Closed {
            self.shutdown_parent().await;
            return Ok(());
        }

        if self.shared.get().can_send_close() {
            // A dead output does not stop the handshake from terminating.
            if let Err(e) = self.sender.send_close(code, reason).await {
                debug!(error = %e, "close frame could not be sent");
                self.shared.force_closed();
            }
        }

        while self.shared.get() == EndpointState::SentClose {
            match self.reader.read_frame().await {
                Ok(frame) => match frame.opcode {
                    OpCode::Close => {
                        self.shared.close_received();
                    }
                    OpCode::Ping | OpCode::Pong => {}
                    opcode => {
                        self.shared.force_closed();
                        self.shutdown_parent().await;
                        return Err(Error::UnexpectedMessage { opcode });
                    }
                },
                Err(Error::ConnectionClosed(_)) => {
                    // Peer dropped the stream instead of answering; the
                    // handshake still terminates.
                    self.shared.force_closed();
                }
                Err(e) => {
                    self.shared.force_closed();
                    self.shutdown_parent().await;
                    return Err(e);
                }
            }
        }

        self.shared.force_closed();
        debug!("closing handshake complete");
        self.shutdown_parent().await;
        Ok(())
    }

    /// Fail the connection: discard any partial message, send a
    /// best-effort close with the code mapped from `err`, and mark the
    /// endpoint closed.
    async fn fail(&mut self, err: Error) -> Error {
        self.assembler.reset();
        if let Some(code) = err.close_code() {
            if self.shared.get().can_send_close() {
                let reason = err.to_string();
                if let Err(e) = self.sender.send_close(code, truncate_reason(&reason)).await {
                    debug!(error = %e, "failure close could not be sent");
                }
            }
        }
        self.shared.force_closed();
        debug!(error = %err, "connection failed");
        err
    }

    async fn shutdown_parent(&mut self) {
        if self.close_parent && !self.parent_closed {
            self.parent_closed = true;
            if let Err(e) = self.sender.shutdown().await {
                debug!(error = %e, "stream shutdown failed");
            }
        }
    }
}

/// Decode a close frame payload into an optional code/reason pair.
///
/// An empty payload means "no status"; a 1-byte payload is malformed; a
/// code outside the ranges RFC 6455 permits on the wire, or a non-UTF-8
/// reason, fails the connection.
fn parse_close_payload(payload: &[u8]) -> Result<Option<CloseFrame>> {
    match payload.len() {
        0 => Ok(None),
        1 => Err(Error::ProtocolViolation(
            "close frame with 1-byte payload".into(),
        )),
        _ => {
            let code = CloseCode::from_u16(u16::from_be_bytes([payload[0], payload[1]]));
            if !code.is_valid() {
                return Err(Error::InvalidCloseCode(code.as_u16()));
            }
            let reason = std::str::from_utf8(&payload[2..]).map_err(|_| Error::InvalidUtf8)?;
            Ok(Some(CloseFrame::new(code, reason.to_owned())))
        }
    }
}

/// Turn a reassembled message into its application shape, validating text
/// as UTF-8 at the message boundary.
fn assembled_to_message(assembled: AssembledMessage) -> Result<Message> {
    match assembled.opcode {
        OpCode::Text => Ok(Message::Text(assembled.into_text()?)),
        OpCode::Binary => Ok(Message::Binary(assembled.into_binary())),
        _ => Err(Error::ProtocolViolation("Unexpected opcode".into())),
    }
}
