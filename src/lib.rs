//! # wsframe - RFC 6455 WebSocket endpoint library
//!
//! `wsframe` layers a message-oriented, bidirectional protocol on top of
//! an arbitrary async byte stream: frame parsing and emission with
//! masking, fragment reassembly, control-frame interleaving, the
//! symmetric closing handshake, and the HTTP upgrade handshake that
//! bootstraps it all.
//!
//! ## Features
//!
//! - **Full RFC 6455 framing** with strict validation and explicit
//!   protocol-error close codes
//! - **Streamed writes** - payloads are never buffered whole on the send
//!   path
//! - **Concurrent senders** serialized at message granularity
//! - **Subprotocol negotiation** honoring client preference order
//! - **Bounded resources** - frame, message, fragment and handshake
//!   limits
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use wsframe::{upgrade, CloseCode, Config, Message};
//!
//! // Server: accept an upgrade on an established stream
//! let mut ws = upgrade::accept(stream, Config::default()).await?;
//! while let Some(msg) = ws.recv().await? {
//!     if msg.is_close() { break; }
//!     ws.send(msg).await?;
//! }
//! ws.close(CloseCode::Normal, "done").await?;
//! ```

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod message;
pub mod protocol;
pub mod upgrade;

pub use codec::{FrameReader, FrameWriter};
pub use config::{Config, Limits};
pub use connection::{EndpointState, MessageSender, Role, WebSocket};
pub use error::{Error, Result};
pub use message::{CloseCode, CloseFrame, Message};
pub use protocol::{compute_accept_key, Frame, OpCode, WS_GUID};
