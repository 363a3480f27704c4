//! Error types for the WebSocket endpoint implementation.
//!
//! This module defines all error conditions that can occur during WebSocket
//! operations, following RFC 6455 requirements. Protocol failures carry a
//! mapping to the close code the endpoint sends before failing the
//! connection (see [`Error::close_code`]).

use thiserror::Error;

use crate::message::CloseCode;
use crate::protocol::OpCode;

/// Result type alias for WebSocket operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during WebSocket operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid frame structure or header.
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Protocol violation detected.
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Invalid UTF-8 in a text message or close reason.
    #[error("Invalid UTF-8 in text payload")]
    InvalidUtf8,

    /// Frame size exceeds configured maximum.
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge {
        /// Actual frame size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Message size exceeds configured maximum.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Actual message size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// Too many fragments in a single message.
    #[error("Too many fragments: {count} (max: {max})")]
    TooManyFragments {
        /// Actual fragment count.
        count: usize,
        /// Maximum allowed fragments.
        max: usize,
    },

    /// The endpoint has been closed; reads and writes are no longer possible.
    #[error("Connection closed: {0:?}")]
    ConnectionClosed(Option<u16>),

    /// Invalid WebSocket handshake (missing/invalid headers, bad request line).
    #[error("Invalid handshake: {0}")]
    InvalidHandshake(String),

    /// The server's `Sec-WebSocket-Accept` did not match the expected value.
    #[error("Handshake accept key mismatch: expected {expected}, got {actual}")]
    AcceptKeyMismatch {
        /// The value computed from the key we sent.
        expected: String,
        /// The value the server returned.
        actual: String,
    },

    /// Unsupported `Sec-WebSocket-Version`; only version 13 is spoken.
    #[error("Unsupported WebSocket version: {0} (expected 13)")]
    UnsupportedVersion(u8),

    /// Handshake data exceeds the configured maximum.
    #[error("Handshake too large: {size} bytes (max: {max})")]
    HandshakeTooLarge {
        /// Actual handshake size.
        size: usize,
        /// Maximum allowed size.
        max: usize,
    },

    /// A header value to be emitted contained CR or LF characters.
    #[error("Invalid value for header {header}: {reason}")]
    InvalidHeaderValue {
        /// Header name.
        header: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid close code.
    #[error("Invalid close code: {0}")]
    InvalidCloseCode(u16),

    /// Reserved opcode used.
    #[error("Reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// Control frame fragmented (RFC violation).
    #[error("Control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// Control frame payload too large (>125 bytes).
    #[error("Control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(usize),

    /// Unmasked client frame (security violation).
    #[error("Client frame must be masked")]
    UnmaskedClientFrame,

    /// Masked server frame (security violation).
    #[error("Server frame must not be masked")]
    MaskedServerFrame,

    /// Reserved bits set without extension.
    #[error("Reserved bits set without negotiated extension")]
    ReservedBitsSet,

    /// Incomplete frame data.
    #[error("Incomplete frame: need {needed} more bytes")]
    IncompleteFrame {
        /// Number of additional bytes needed.
        needed: usize,
    },

    /// Invalid opcode value.
    #[error("Invalid opcode: {0:#x}")]
    InvalidOpcode(u8),

    /// Payload length does not fit in this platform's `usize`.
    #[error("Payload length {size} exceeds platform maximum {max}")]
    PayloadTooLargeForPlatform {
        /// Declared payload length.
        size: u64,
        /// Platform maximum.
        max: u64,
    },

    /// A non-close data frame arrived during the closing handshake.
    #[error("Unexpected {opcode} message during closing handshake")]
    UnexpectedMessage {
        /// Opcode of the offending frame.
        opcode: OpCode,
    },
}

impl Error {
    /// The close code the endpoint sends to the peer before failing the
    /// connection with this error, if any.
    ///
    /// Frame-level and fragmentation violations map to 1002 (protocol
    /// error), invalid UTF-8 to 1007, size-limit violations to 1009.
    /// Handshake and I/O failures occur outside the framing layer and
    /// carry no close code.
    #[must_use]
    pub fn close_code(&self) -> Option<CloseCode> {
        match self {
            Error::InvalidFrame(_)
            | Error::ProtocolViolation(_)
            | Error::ReservedOpcode(_)
            | Error::InvalidOpcode(_)
            | Error::FragmentedControlFrame
            | Error::ControlFrameTooLarge(_)
            | Error::UnmaskedClientFrame
            | Error::MaskedServerFrame
            | Error::ReservedBitsSet
            | Error::InvalidCloseCode(_) => Some(CloseCode::ProtocolError),
            Error::InvalidUtf8 => Some(CloseCode::InvalidPayload),
            Error::FrameTooLarge { .. }
            | Error::MessageTooLarge { .. }
            | Error::TooManyFragments { .. }
            | Error::PayloadTooLargeForPlatform { .. } => Some(CloseCode::MessageTooBig),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}
