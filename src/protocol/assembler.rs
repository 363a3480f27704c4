//! Message reassembly from fragmented WebSocket frames (RFC 6455 Section 5.4).

use bytes::BytesMut;

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::protocol::{Frame, OpCode};

/// Reassembles data frames into complete messages.
///
/// At most one partial message exists at a time: the opcode and RSV bits
/// of its first fragment plus the accumulated payload. A new data opcode
/// while a partial is in progress, or a continuation with no partial, is a
/// protocol error. Control frames never enter the assembler; they are
/// handled by the endpoint between fragments.
pub struct MessageAssembler {
    buffer: BytesMut,
    fragment_count: usize,
    opcode: Option<OpCode>,
    rsv: u8,
    limits: Limits,
}

impl MessageAssembler {
    /// Create an assembler enforcing the given limits.
    pub fn new(limits: Limits) -> Self {
        Self {
            buffer: BytesMut::new(),
            fragment_count: 0,
            opcode: None,
            rsv: 0,
            limits,
        }
    }

    /// Add a data frame to the message being assembled.
    ///
    /// Returns `Some(message)` when FIN=1 completes the message, `None`
    /// while more fragments are expected.
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` on fragmentation-order violations
    /// - `Error::MessageTooLarge` / `Error::TooManyFragments` on limit
    ///   violations
    pub fn push(&mut self, frame: Frame) -> Result<Option<AssembledMessage>> {
        if frame.opcode.is_control() {
            return Ok(None);
        }

        if frame.opcode == OpCode::Continuation {
            if self.opcode.is_none() {
                return Err(Error::ProtocolViolation(
                    "Unexpected continuation frame".into(),
                ));
            }
        } else {
            if self.opcode.is_some() {
                return Err(Error::ProtocolViolation(
                    "Expected continuation frame".into(),
                ));
            }
            self.opcode = Some(frame.opcode);
            self.rsv = frame.rsv();
        }

        self.limits.check_fragment_count(self.fragment_count + 1)?;

        let new_size = self.buffer.len() + frame.payload().len();
        self.limits.check_message_size(new_size)?;

        self.buffer.extend_from_slice(frame.payload());
        self.fragment_count += 1;

        if frame.fin {
            let payload = self.buffer.split().to_vec();
            let opcode = self.opcode.take().unwrap();
            let rsv = self.rsv;
            self.fragment_count = 0;
            self.rsv = 0;
            Ok(Some(AssembledMessage {
                opcode,
                payload,
                rsv,
            }))
        } else {
            Ok(None)
        }
    }

    /// Whether a partial message is in progress.
    pub fn is_assembling(&self) -> bool {
        self.opcode.is_some()
    }

    /// Discard any partial message (used on connection failure).
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.fragment_count = 0;
        self.opcode = None;
        self.rsv = 0;
    }
}

/// A fully reassembled WebSocket message.
///
/// The RSV bits of the first fragment are carried through for callers
/// that opted into accepting reserved bits.
pub struct AssembledMessage {
    /// Opcode of the first fragment (Text or Binary).
    pub opcode: OpCode,
    /// Concatenated payload of all fragments.
    pub payload: Vec<u8>,
    /// RSV bits of the first fragment, packed (`rsv1` high).
    pub rsv: u8,
}

impl AssembledMessage {
    /// Interpret the payload as text.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if the payload is not valid UTF-8.
    /// Validation happens here, at the message boundary, rather than per
    /// fragment.
    pub fn into_text(self) -> Result<String> {
        String::from_utf8(self.payload).map_err(|_| Error::InvalidUtf8)
    }

    /// Take the payload as raw bytes.
    pub fn into_binary(self) -> Vec<u8> {
        self.payload
    }
}
