//! WebSocket endpoint management and state machine.
//!
//! The [`WebSocket`] type binds a frame reader and a shared sender over
//! the two halves of a stream, yielding the message-level interface:
//! `send`, `recv`, `close`, plus the negotiated-property surface.
//!
//! ## Endpoint lifecycle
//!
//! 1. **Open** - after a successful handshake
//! 2. **SentClose** / **ReceivedClose** - one side of the closing
//!    handshake has happened
//! 3. **Closed** - both close frames exchanged; terminal
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsframe::{CloseCode, Config, Message, Role, WebSocket};
//!
//! let mut ws = WebSocket::new(stream, Role::Client, Config::default());
//! ws.send(Message::text("Hello")).await?;
//! if let Some(msg) = ws.recv().await? {
//!     println!("received: {msg:?}");
//! }
//! ws.close(CloseCode::Normal, "done").await?;
//! ```

mod fragmenter;
mod role;
mod sender;
mod state;

pub use fragmenter::MessageFragmenter;
pub use role::Role;
pub use sender::MessageSender;
pub use state::EndpointState;

#[allow(clippy::module_inception)]
mod connection;

pub use connection::WebSocket;
