//! WebSocket opening handshake (RFC 6455 Section 4).
//!
//! Pure parsing and serialization of the HTTP Upgrade mechanism; the I/O
//! that drives it lives in [`upgrade`](crate::upgrade). Both sides of the
//! handshake are covered: the client's GET request, the server's 101
//! response, the accept-key computation binding the two, and the
//! subprotocol negotiation carried in `Sec-WebSocket-Protocol`.

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// The GUID used in the Sec-WebSocket-Accept calculation (RFC 6455).
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// The only WebSocket protocol version this crate speaks.
pub const WS_VERSION: u8 = 13;

/// Parse HTTP headers from an iterator of lines into a case-insensitive map.
///
/// When `security_headers` is given, duplicates of those headers are
/// rejected (request smuggling hardening).
fn parse_headers<'a, I>(
    lines: I,
    security_headers: Option<&[&str]>,
) -> Result<HashMap<String, String>>
where
    I: Iterator<Item = &'a str>,
{
    let mut headers: HashMap<String, String> = HashMap::new();

    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name_lower = name.trim().to_lowercase();

            if let Some(sec_headers) = security_headers {
                if sec_headers.contains(&name_lower.as_str()) && headers.contains_key(&name_lower) {
                    return Err(Error::InvalidHandshake(format!(
                        "Duplicate header: {}",
                        name.trim()
                    )));
                }
            }

            headers.insert(name_lower, value.trim().to_string());
        }
    }

    Ok(headers)
}

/// Reject header values that would allow CR/LF injection into the
/// serialized handshake.
fn validate_header_value(header_name: &str, value: &str) -> Result<()> {
    if value.contains('\r') || value.contains('\n') {
        return Err(Error::InvalidHeaderValue {
            header: header_name.to_string(),
            reason: "contains CR or LF characters".to_string(),
        });
    }
    Ok(())
}

/// Check that a `Connection` header contains the token `upgrade`
/// (comma-split, case-insensitive).
fn connection_has_upgrade(value: &str) -> bool {
    value
        .split(',')
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"))
}

/// Compute the `Sec-WebSocket-Accept` value from the client's
/// `Sec-WebSocket-Key`.
///
/// The accept key is `Base64(SHA-1(key ++ GUID))`. Neither side inspects
/// the structure of the key beyond base64/length validation.
///
/// # Example
///
/// ```
/// use wsframe::protocol::handshake::compute_accept_key;
///
/// let key = "dGhlIHNhbXBsZSBub25jZQ==";
/// assert_eq!(compute_accept_key(key), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
pub fn compute_accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Generate a fresh `Sec-WebSocket-Key`: 16 random bytes, base64-encoded.
///
/// # Errors
///
/// Returns `Error::Io` if the system entropy source fails.
pub fn generate_client_key() -> Result<String> {
    let mut nonce = [0u8; 16];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| Error::Io(format!("entropy source failed: {e}")))?;
    Ok(BASE64.encode(nonce))
}

/// Pick the subprotocol for a connection.
///
/// Returns the first *client-offered* name that appears in the server's
/// accepted list, honoring client preference order. `None` means the
/// connection proceeds without a subprotocol.
#[must_use]
pub fn negotiate_subprotocol(offered: &[String], accepted: &[String]) -> Option<String> {
    offered
        .iter()
        .find(|name| accepted.iter().any(|a| a == *name))
        .cloned()
}

/// Validate the `Origin` header against an allow-list.
///
/// An empty allow-list accepts any origin (or none).
pub fn validate_origin(origin: Option<&str>, allowed: &[String]) -> Result<()> {
    if allowed.is_empty() {
        return Ok(());
    }

    match origin {
        Some(o) if allowed.iter().any(|a| a == o) => Ok(()),
        Some(o) => Err(Error::InvalidHandshake(format!(
            "Origin not allowed: {o}"
        ))),
        None => Err(Error::InvalidHandshake(
            "Origin not allowed: (none)".into(),
        )),
    }
}

/// Parsed WebSocket upgrade request from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// The request path (e.g. "/chat").
    pub path: String,
    /// The Host header value.
    pub host: String,
    /// The Sec-WebSocket-Key header value.
    pub key: String,
    /// The Sec-WebSocket-Version (must be 13 to validate).
    pub version: u8,
    /// The Origin header value, if present.
    pub origin: Option<String>,
    /// Offered subprotocols in client preference order.
    pub protocols: Vec<String>,
}

impl HandshakeRequest {
    /// Build a request to emit from the client side.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the entropy source fails while generating
    /// the key.
    pub fn build(
        host: impl Into<String>,
        path: impl Into<String>,
        protocols: Vec<String>,
    ) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            host: host.into(),
            key: generate_client_key()?,
            version: WS_VERSION,
            origin: None,
            protocols,
        })
    }

    /// Parse a WebSocket upgrade request from raw HTTP data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandshake`] if:
    /// - The data is not valid UTF-8.
    /// - The request line is malformed, not `GET`, or not `HTTP/1.1`.
    /// - `Upgrade`, `Connection`, `Host`, `Sec-WebSocket-Key` or
    ///   `Sec-WebSocket-Version` headers are missing or malformed.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|_| Error::InvalidHandshake("Invalid UTF-8".into()))?;

        let mut lines = text.lines();

        // Request line: "GET /path HTTP/1.1"
        let request_line = lines
            .next()
            .ok_or_else(|| Error::InvalidHandshake("Empty request".into()))?;

        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(Error::InvalidHandshake("Invalid request line".into()));
        }

        if parts[0] != "GET" {
            return Err(Error::InvalidHandshake(format!(
                "Expected GET method, got {}",
                parts[0]
            )));
        }

        if !parts[2].starts_with("HTTP/1.1") {
            return Err(Error::InvalidHandshake(format!(
                "Expected HTTP/1.1, got {}",
                parts[2]
            )));
        }

        let path = parts[1].to_string();

        let security_headers = [
            "host",
            "upgrade",
            "connection",
            "sec-websocket-key",
            "sec-websocket-version",
        ];
        let headers = parse_headers(lines, Some(&security_headers))?;

        let upgrade = headers
            .get("upgrade")
            .ok_or_else(|| Error::InvalidHandshake("Missing Upgrade header".into()))?;
        if !upgrade.eq_ignore_ascii_case("websocket") {
            return Err(Error::InvalidHandshake(format!(
                "Invalid Upgrade header: {upgrade}"
            )));
        }

        let connection = headers
            .get("connection")
            .ok_or_else(|| Error::InvalidHandshake("Missing Connection header".into()))?;
        if !connection_has_upgrade(connection) {
            return Err(Error::InvalidHandshake(format!(
                "Invalid Connection header: {connection}"
            )));
        }

        let host = headers
            .get("host")
            .ok_or_else(|| Error::InvalidHandshake("Missing Host header".into()))?
            .clone();

        let key = headers
            .get("sec-websocket-key")
            .ok_or_else(|| Error::InvalidHandshake("Missing Sec-WebSocket-Key header".into()))?
            .clone();

        let version_str = headers.get("sec-websocket-version").ok_or_else(|| {
            Error::InvalidHandshake("Missing Sec-WebSocket-Version header".into())
        })?;
        let version: u8 = version_str
            .parse()
            .map_err(|_| Error::InvalidHandshake(format!("Invalid version: {version_str}")))?;

        let origin = headers.get("origin").cloned();

        let protocols = headers
            .get("sec-websocket-protocol")
            .map(|p| p.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(Self {
            path,
            host,
            key,
            version,
            origin,
            protocols,
        })
    }

    /// Validate the request according to RFC 6455.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedVersion`] if the version is not 13 (the
    ///   rejection response must advertise `Sec-WebSocket-Version: 13`)
    /// - [`Error::InvalidHandshake`] if the key is not 16 bytes of base64
    ///   or the host is empty
    pub fn validate(&self) -> Result<()> {
        if self.version != WS_VERSION {
            return Err(Error::UnsupportedVersion(self.version));
        }

        match BASE64.decode(&self.key) {
            Ok(decoded) => {
                if decoded.len() != 16 {
                    return Err(Error::InvalidHandshake(format!(
                        "Sec-WebSocket-Key must be 16 bytes, got {}",
                        decoded.len()
                    )));
                }
            }
            Err(_) => {
                return Err(Error::InvalidHandshake(
                    "Invalid Sec-WebSocket-Key: not valid Base64".into(),
                ));
            }
        }

        if self.host.is_empty() {
            return Err(Error::InvalidHandshake(
                "Host header cannot be empty".into(),
            ));
        }

        Ok(())
    }

    /// Serialize the upgrade request for sending from the client side.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidHeaderValue` if the host, path or a protocol
    /// name contains CR/LF.
    pub fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        validate_header_value("Host", &self.host)?;
        validate_header_value("path", &self.path)?;

        buf.extend_from_slice(format!("GET {} HTTP/1.1\r\n", self.path).as_bytes());
        buf.extend_from_slice(format!("Host: {}\r\n", self.host).as_bytes());
        buf.extend_from_slice(b"Upgrade: websocket\r\n");
        buf.extend_from_slice(b"Connection: Keep-alive, Upgrade\r\n");
        buf.extend_from_slice(format!("Sec-WebSocket-Key: {}\r\n", self.key).as_bytes());
        buf.extend_from_slice(format!("Sec-WebSocket-Version: {}\r\n", self.version).as_bytes());

        if !self.protocols.is_empty() {
            let list = self.protocols.join(", ");
            validate_header_value("Sec-WebSocket-Protocol", &list)?;
            buf.extend_from_slice(format!("Sec-WebSocket-Protocol: {list}\r\n").as_bytes());
        }

        buf.extend_from_slice(b"\r\n");
        Ok(())
    }
}

/// WebSocket upgrade response from a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeResponse {
    /// The Sec-WebSocket-Accept value.
    pub accept: String,
    /// The selected Sec-WebSocket-Protocol, if any.
    pub protocol: Option<String>,
}

impl HandshakeResponse {
    /// Create a response accepting `req`, negotiating a subprotocol from
    /// the server's accepted list.
    pub fn accept(req: &HandshakeRequest, accepted_protocols: &[String]) -> Self {
        Self {
            accept: compute_accept_key(&req.key),
            protocol: negotiate_subprotocol(&req.protocols, accepted_protocols),
        }
    }

    /// Serialize the 101 Switching Protocols response.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidHeaderValue` if the protocol contains CR/LF.
    pub fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(b"HTTP/1.1 101 Switching Protocols\r\n");
        buf.extend_from_slice(b"Upgrade: websocket\r\n");
        buf.extend_from_slice(b"Connection: Upgrade\r\n");
        buf.extend_from_slice(format!("Sec-WebSocket-Accept: {}\r\n", self.accept).as_bytes());

        if let Some(ref proto) = self.protocol {
            validate_header_value("Sec-WebSocket-Protocol", proto)?;
            buf.extend_from_slice(format!("Sec-WebSocket-Protocol: {proto}\r\n").as_bytes());
        }

        buf.extend_from_slice(b"\r\n");
        Ok(())
    }

    /// Serialize an HTTP 400 rejection for a failed upgrade.
    ///
    /// A missing or mismatched version advertises the supported version so
    /// conforming clients can retry.
    pub fn write_rejection(error: &Error, buf: &mut Vec<u8>) {
        buf.extend_from_slice(b"HTTP/1.1 400 Bad Request\r\n");
        let version_problem = matches!(error, Error::UnsupportedVersion(_))
            || matches!(error, Error::InvalidHandshake(msg) if msg.contains("Sec-WebSocket-Version"));
        if version_problem {
            buf.extend_from_slice(format!("Sec-WebSocket-Version: {WS_VERSION}\r\n").as_bytes());
        }
        let body = error.to_string();
        buf.extend_from_slice(format!("Content-Length: {}\r\n", body.len()).as_bytes());
        buf.extend_from_slice(b"Content-Type: text/plain\r\n\r\n");
        buf.extend_from_slice(body.as_bytes());
    }

    /// Parse a WebSocket upgrade response from raw HTTP data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHandshake`] if:
    /// - The data is not valid UTF-8 or the status line is missing.
    /// - The status code is not `101 Switching Protocols`.
    /// - `Upgrade`, `Connection`, or `Sec-WebSocket-Accept` headers are
    ///   missing or malformed.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(data)
            .map_err(|_| Error::InvalidHandshake("Invalid UTF-8".into()))?;

        let mut lines = text.lines();

        let status_line = lines
            .next()
            .ok_or_else(|| Error::InvalidHandshake("Empty response".into()))?;

        if !status_line.starts_with("HTTP/1.1 101") {
            return Err(Error::InvalidHandshake(format!(
                "Expected 101 status, got: {status_line}"
            )));
        }

        let headers = parse_headers(lines, None)?;

        let upgrade = headers
            .get("upgrade")
            .ok_or_else(|| Error::InvalidHandshake("Missing Upgrade header in response".into()))?;
        if !upgrade.eq_ignore_ascii_case("websocket") {
            return Err(Error::InvalidHandshake(format!(
                "Invalid Upgrade header: {upgrade}"
            )));
        }

        let connection = headers.get("connection").ok_or_else(|| {
            Error::InvalidHandshake("Missing Connection header in response".into())
        })?;
        if !connection_has_upgrade(connection) {
            return Err(Error::InvalidHandshake(format!(
                "Invalid Connection header: {connection}"
            )));
        }

        let accept = headers
            .get("sec-websocket-accept")
            .ok_or_else(|| Error::InvalidHandshake("Missing Sec-WebSocket-Accept header".into()))?
            .clone();

        let protocol = headers.get("sec-websocket-protocol").cloned();

        Ok(Self { accept, protocol })
    }

    /// Verify this response against the request it answers.
    ///
    /// # Errors
    ///
    /// - [`Error::AcceptKeyMismatch`] if the accept key is wrong
    /// - [`Error::InvalidHandshake`] if the server selected a subprotocol
    ///   the client never offered
    pub fn verify(&self, req: &HandshakeRequest) -> Result<()> {
        let expected = compute_accept_key(&req.key);
        if self.accept != expected {
            return Err(Error::AcceptKeyMismatch {
                expected,
                actual: self.accept.clone(),
            });
        }

        if let Some(ref selected) = self.protocol {
            if !req.protocols.iter().any(|p| p == selected) {
                return Err(Error::InvalidHandshake(format!(
                    "Server selected unoffered subprotocol: {selected}"
                )));
            }
        }

        Ok(())
    }
}
