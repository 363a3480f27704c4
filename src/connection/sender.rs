//! Outgoing message serialization with a per-endpoint write lock.
//!
//! A [`MessageSender`] is a cloneable handle; every clone shares one
//! [`FrameWriter`] behind an async mutex. The lock is held for the whole
//! message, not per frame, so fragments from concurrent senders never
//! interleave on the wire.

use std::sync::Arc;

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::codec::FrameWriter;
use crate::connection::state::EndpointState;
use crate::connection::MessageFragmenter;
use crate::error::{Error, Result};
use crate::message::{CloseCode, Message};
use crate::protocol::frame::MAX_CONTROL_FRAME_PAYLOAD;
use crate::protocol::{Frame, OpCode};

/// Longest close reason that fits a control frame next to the 2-byte code.
pub const MAX_CLOSE_REASON: usize = MAX_CONTROL_FRAME_PAYLOAD - 2;

/// State cell shared between an endpoint's reader and all sender clones.
///
/// Close transitions driven by the write path happen under the writer
/// lock; the read path only ever observes or forces `Closed`.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    state: std::sync::Mutex<EndpointState>,
}

impl Shared {
    pub(crate) fn get(&self) -> EndpointState {
        *self.state.lock().expect("state lock poisoned")
    }

    pub(crate) fn close_sent(&self) -> EndpointState {
        let mut state = self.state.lock().expect("state lock poisoned");
        *state = state.on_close_sent();
        *state
    }

    pub(crate) fn close_received(&self) -> EndpointState {
        let mut state = self.state.lock().expect("state lock poisoned");
        *state = state.on_close_received();
        *state
    }

    pub(crate) fn force_closed(&self) {
        *self.state.lock().expect("state lock poisoned") = EndpointState::Closed;
    }
}

/// Truncate a close reason to [`MAX_CLOSE_REASON`] bytes on a character
/// boundary.
pub(crate) fn truncate_reason(reason: &str) -> &str {
    if reason.len() <= MAX_CLOSE_REASON {
        return reason;
    }
    let mut end = MAX_CLOSE_REASON;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    &reason[..end]
}

/// Cloneable sending half of a WebSocket endpoint.
pub struct MessageSender<W> {
    writer: Arc<Mutex<FrameWriter<W>>>,
    shared: Arc<Shared>,
    fragment_size: Option<usize>,
}

impl<W> Clone for MessageSender<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            shared: Arc::clone(&self.shared),
            fragment_size: self.fragment_size,
        }
    }
}

impl<W> MessageSender<W> {
    pub(crate) fn new(
        writer: FrameWriter<W>,
        shared: Arc<Shared>,
        fragment_size: Option<usize>,
    ) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            shared,
            fragment_size,
        }
    }

    /// Current endpoint state as seen by the write path.
    #[must_use]
    pub fn state(&self) -> EndpointState {
        self.shared.get()
    }
}

impl<W: AsyncWrite + Unpin> MessageSender<W> {
    /// Send a message.
    ///
    /// Data messages are fragmented at the configured threshold; control
    /// messages go out as a single frame. Close messages route through
    /// the close-specific path and its state transition.
    ///
    /// # Errors
    ///
    /// - `Error::ConnectionClosed` once a close frame has been sent
    /// - `Error::ControlFrameTooLarge` for oversized control payloads
    /// - I/O errors from the underlying stream
    pub async fn send(&self, message: Message) -> Result<()> {
        match message {
            Message::Close(Some(frame)) => self.send_close(frame.code, &frame.reason).await,
            Message::Close(None) => self.send_close_frame(Frame::close(None, "")).await,
            control if control.is_control() => {
                let frame = Frame::from(control);
                frame.validate()?;
                let mut writer = self.writer.lock().await;
                if !self.shared.get().can_send_data() {
                    return Err(Error::ConnectionClosed(None));
                }
                writer.write_frame(&frame).await?;
                writer.flush().await
            }
            data => self.send_data(data).await,
        }
    }

    /// Send a text message.
    pub async fn send_text(&self, text: impl Into<String>) -> Result<()> {
        self.send(Message::Text(text.into())).await
    }

    /// Send a binary message.
    pub async fn send_binary(&self, data: impl Into<Vec<u8>>) -> Result<()> {
        self.send(Message::Binary(data.into())).await
    }

    /// Send a ping frame.
    pub async fn send_ping(&self, data: impl Into<Vec<u8>>) -> Result<()> {
        self.send(Message::Ping(data.into())).await
    }

    /// Send a pong frame.
    pub async fn send_pong(&self, data: impl Into<Vec<u8>>) -> Result<()> {
        self.send(Message::Pong(data.into())).await
    }

    /// Send a close frame and record that our side of the closing
    /// handshake is done.
    ///
    /// A no-op once a close frame has already been sent. Long reasons are
    /// truncated to fit a control frame.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidCloseCode` for reserved codes (1004-1006, 1015)
    /// - I/O errors from the underlying stream
    pub async fn send_close(&self, code: CloseCode, reason: &str) -> Result<()> {
        if code.is_reserved() || !code.is_valid() {
            return Err(Error::InvalidCloseCode(code.as_u16()));
        }
        self.send_close_frame(Frame::close(Some(code.as_u16()), truncate_reason(reason)))
            .await
    }

    async fn send_close_frame(&self, frame: Frame) -> Result<()> {
        let mut writer = self.writer.lock().await;
        if !self.shared.get().can_send_close() {
            return Ok(());
        }
        writer.write_frame(&frame).await?;
        writer.flush().await?;
        self.shared.close_sent();
        Ok(())
    }

    async fn send_data(&self, message: Message) -> Result<()> {
        let payload = message.payload();
        let opcode = if message.is_text() {
            OpCode::Text
        } else {
            OpCode::Binary
        };

        // The lock spans every fragment of this message.
        let mut writer = self.writer.lock().await;
        if !self.shared.get().can_send_data() {
            return Err(Error::ConnectionClosed(None));
        }

        match self.fragment_size {
            Some(size) if payload.len() > size => {
                for frame in MessageFragmenter::new(payload, opcode, size) {
                    writer.write_frame(&frame).await?;
                }
            }
            _ => {
                writer
                    .write_frame(&Frame::new(true, opcode, payload.to_vec()))
                    .await?;
            }
        }

        writer.flush().await
    }

    /// Shut down the write side of the underlying stream.
    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.shared.force_closed();
        self.writer.lock().await.shutdown().await
    }
}
