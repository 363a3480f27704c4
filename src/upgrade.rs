//! Opening-handshake I/O (RFC 6455 Section 4).
//!
//! Drives the HTTP Upgrade exchange over an established byte stream and
//! wraps the result as a [`WebSocket`] endpoint: [`accept`] for the server
//! side, [`connect`] for the client side, and [`serve`] for the guarded
//! server pattern that closes the connection however the handler exits.
//!
//! Socket acquisition (TCP, TLS, DNS) is the caller's business; every
//! function here takes a stream that is already connected.

use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::{Config, Limits};
use crate::connection::{Role, WebSocket};
use crate::error::{Error, Result};
use crate::message::CloseCode;
use crate::protocol::handshake::{validate_origin, HandshakeRequest, HandshakeResponse};

/// Read an HTTP message head up to and including the blank line.
///
/// Reads one byte at a time so nothing past the terminator is consumed;
/// any WebSocket frames the peer pipelined after the handshake must stay
/// in the stream for the endpoint.
async fn read_head<S: AsyncRead + Unpin>(io: &mut S, limits: &Limits) -> Result<Vec<u8>> {
    let mut head = Vec::with_capacity(512);
    let mut byte = [0u8; 1];

    loop {
        let n = io.read(&mut byte).await?;
        if n == 0 {
            return Err(Error::InvalidHandshake(
                "stream ended during handshake".into(),
            ));
        }
        head.push(byte[0]);
        limits.check_handshake_size(head.len())?;
        if head.ends_with(b"\r\n\r\n") {
            return Ok(head);
        }
    }
}

/// Accept a WebSocket upgrade on the server side.
///
/// Reads and validates the client's upgrade request, negotiates a
/// subprotocol from `config.subprotocols`, answers with `101 Switching
/// Protocols`, and wraps the stream as a server-mode endpoint.
///
/// On a rejected request an HTTP 400 is written back (advertising
/// `Sec-WebSocket-Version: 13` on version mismatch) and the error is
/// returned; no endpoint is created.
///
/// # Errors
///
/// - `Error::InvalidHandshake` / `Error::UnsupportedVersion` /
///   `Error::HandshakeTooLarge` for a bad request
/// - `Error::Io` on stream failure
pub async fn accept<T>(mut stream: T, config: Config) -> Result<WebSocket<T>>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let head = read_head(&mut stream, &config.limits).await?;

    let validated = HandshakeRequest::parse(&head).and_then(|request| {
        request.validate()?;
        if let Some(ref allowed) = config.allowed_origins {
            validate_origin(request.origin.as_deref(), allowed)?;
        }
        Ok(request)
    });

    let request = match validated {
        Ok(request) => request,
        Err(e) => {
            let mut buf = Vec::new();
            HandshakeResponse::write_rejection(&e, &mut buf);
            let _ = stream.write_all(&buf).await;
            let _ = stream.flush().await;
            debug!(error = %e, "upgrade rejected");
            return Err(e);
        }
    };

    let response = HandshakeResponse::accept(&request, &config.subprotocols);
    let mut buf = Vec::new();
    response.write(&mut buf)?;
    stream.write_all(&buf).await?;
    stream.flush().await?;

    debug!(path = %request.path, protocol = ?response.protocol, "upgrade accepted");

    let protocol = response.protocol;
    let mut ws = WebSocket::new(stream, Role::Server, config);
    ws.set_subprotocol(protocol);
    Ok(ws)
}

/// Accept an upgrade and run a handler with a guaranteed close.
///
/// With `config.guarded` (the default), the endpoint is closed on every
/// handler exit path: normal completion sends close(1000, "bye"), failure
/// sends close(1011, error message). With `guarded` off, the handler is
/// responsible for closing.
///
/// ```rust,ignore
/// use futures::FutureExt;
///
/// wsframe::upgrade::serve(stream, Config::default(), |ws| {
///     async move {
///         while let Some(msg) = ws.recv().await? {
///             if msg.is_close() { break; }
///             ws.send(msg).await?;
///         }
///         Ok(())
///     }
///     .boxed()
/// })
/// .await?;
/// ```
///
/// # Errors
///
/// Handshake errors, handler errors, and close-handshake I/O errors.
pub async fn serve<T, H>(stream: T, config: Config, handler: H) -> Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
    H: for<'a> FnOnce(&'a mut WebSocket<T>) -> BoxFuture<'a, Result<()>>,
{
    let guarded = config.guarded;
    let mut ws = accept(stream, config).await?;

    if !guarded {
        return handler(&mut ws).await;
    }

    match handler(&mut ws).await {
        Ok(()) => {
            debug!("handler completed");
            ws.close(CloseCode::Normal, "bye").await
        }
        Err(err) => {
            warn!(error = %err, "handler failed");
            let reason = err.to_string();
            let _ = ws.close(CloseCode::InternalError, &reason).await;
            Err(err)
        }
    }
}

/// Perform the client side of the WebSocket upgrade.
///
/// Emits the GET request (offering `config.subprotocols` when non-empty),
/// verifies the server's accept key and subprotocol selection, and wraps
/// the stream as a client-mode endpoint. On any verification failure no
/// endpoint is created.
///
/// # Errors
///
/// - `Error::AcceptKeyMismatch` if the server's accept key is wrong
/// - `Error::InvalidHandshake` for a malformed or non-101 response, or a
///   subprotocol the client never offered
/// - `Error::Io` on stream failure
pub async fn connect<T>(
    mut stream: T,
    host: &str,
    path: &str,
    config: Config,
) -> Result<WebSocket<T>>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let request = HandshakeRequest::build(host, path, config.subprotocols.clone())?;
    let mut buf = Vec::new();
    request.write(&mut buf)?;
    stream.write_all(&buf).await?;
    stream.flush().await?;

    let head = read_head(&mut stream, &config.limits).await?;
    let response = HandshakeResponse::parse(&head)?;
    response.verify(&request)?;

    debug!(host, path, protocol = ?response.protocol, "client upgrade complete");

    let protocol = response.protocol;
    let mut ws = WebSocket::new(stream, Role::Client, config);
    ws.set_subprotocol(protocol);
    Ok(ws)
}
