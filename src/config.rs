//! Configuration and limits for WebSocket endpoints.

/// Resource limits for WebSocket endpoints.
///
/// These limits prevent resource exhaustion attacks and ensure bounded
/// memory usage while reading frames and reassembling messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a single frame payload in bytes.
    ///
    /// Default: 16 MB (16 * 1024 * 1024)
    pub max_frame_size: usize,

    /// Maximum size of a complete message in bytes.
    ///
    /// This applies to the total size after reassembling all fragments.
    /// Violations fail the connection with close code 1009.
    ///
    /// Default: 64 MB (64 * 1024 * 1024)
    pub max_message_size: usize,

    /// Maximum number of fragments in a single message.
    ///
    /// Default: 128
    pub max_fragment_count: usize,

    /// Maximum size of upgrade-handshake data in bytes.
    ///
    /// Default: 8 KB (8192)
    pub max_handshake_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frame_size: 16 * 1024 * 1024,
            max_message_size: 64 * 1024 * 1024,
            max_fragment_count: 128,
            max_handshake_size: 8192,
        }
    }
}

impl Limits {
    /// Create new limits with custom values.
    #[must_use]
    pub const fn new(
        max_frame_size: usize,
        max_message_size: usize,
        max_fragment_count: usize,
        max_handshake_size: usize,
    ) -> Self {
        Self {
            max_frame_size,
            max_message_size,
            max_fragment_count,
            max_handshake_size,
        }
    }

    /// Create limits suitable for small embedded systems.
    ///
    /// - Max frame: 64 KB
    /// - Max message: 256 KB
    /// - Max fragments: 16
    /// - Max handshake: 4 KB
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_frame_size: 64 * 1024,
            max_message_size: 256 * 1024,
            max_fragment_count: 16,
            max_handshake_size: 4096,
        }
    }

    /// Validate that a message size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`](crate::Error::MessageTooLarge) if
    /// `size` exceeds the configured maximum.
    pub const fn check_message_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_message_size {
            Err(crate::Error::MessageTooLarge {
                size,
                max: self.max_message_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a frame size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLarge`](crate::Error::FrameTooLarge) if
    /// `size` exceeds the configured maximum.
    pub const fn check_frame_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_frame_size {
            Err(crate::Error::FrameTooLarge {
                size,
                max: self.max_frame_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a fragment count is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyFragments`](crate::Error::TooManyFragments) if
    /// `count` exceeds the configured maximum.
    pub const fn check_fragment_count(&self, count: usize) -> Result<(), crate::Error> {
        if count > self.max_fragment_count {
            Err(crate::Error::TooManyFragments {
                count,
                max: self.max_fragment_count,
            })
        } else {
            Ok(())
        }
    }

    /// Validate that handshake size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandshakeTooLarge`](crate::Error::HandshakeTooLarge)
    /// if `size` exceeds the configured maximum.
    pub const fn check_handshake_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_handshake_size {
            Err(crate::Error::HandshakeTooLarge {
                size,
                max: self.max_handshake_size,
            })
        } else {
            Ok(())
        }
    }
}

/// WebSocket endpoint configuration.
///
/// Recognized by the open calls in [`upgrade`](crate::upgrade) and by
/// [`WebSocket::new`](crate::WebSocket::new).
#[derive(Debug, Clone)]
pub struct Config {
    /// Resource limits.
    pub limits: Limits,

    /// Fragment threshold for outgoing data messages (in bytes).
    ///
    /// When set, data messages larger than this are split into multiple
    /// frames of at most this size. When `None`, messages are always sent
    /// as a single frame. Control messages are never fragmented.
    ///
    /// Default: None
    pub fragment_size: Option<usize>,

    /// Subprotocol names, in preference order.
    ///
    /// For a client this is the list offered via `Sec-WebSocket-Protocol`;
    /// for a server it is the list of acceptable names. Negotiation picks
    /// the first *client-offered* name present in the server list.
    ///
    /// Default: empty (no subprotocol negotiation)
    pub subprotocols: Vec<String>,

    /// Close the wrapped stream when the endpoint closes.
    ///
    /// When `false`, the caller retains the stream and is responsible for
    /// shutting it down.
    ///
    /// Default: true
    pub close_parent: bool,

    /// Guard the server handler invoked by [`upgrade::serve`](crate::upgrade::serve).
    ///
    /// When `true`, handler completion sends close(1000, "bye") and handler
    /// failure sends close(1011, message) before the stream is released.
    ///
    /// Default: true
    pub guarded: bool,

    /// Accept unmasked frames from clients (server only).
    ///
    /// RFC 6455 requires clients to mask all frames. Setting this to `true`
    /// violates the spec but may be useful for testing.
    ///
    /// Default: false
    pub accept_unmasked_frames: bool,

    /// Accept frames with non-zero RSV bits.
    ///
    /// RFC 6455 requires RSV bits to be zero unless an extension was
    /// negotiated; no extensions are negotiated here, so the default is to
    /// fail the connection. The opt-in keeps the bits visible to callers
    /// driving the frame layer directly.
    ///
    /// Default: false
    pub allow_reserved_bits: bool,

    /// Read buffer size (in bytes).
    ///
    /// Default: 8 KB (8192)
    pub read_buffer_size: usize,

    /// Write scratch-buffer size (in bytes).
    ///
    /// Outgoing payloads are streamed in chunks of at most this size; a
    /// frame is never buffered whole on the write path.
    ///
    /// Default: 8 KB (8192)
    pub write_buffer_size: usize,

    /// Allowed origins for cross-site WebSocket hijacking protection.
    ///
    /// If `Some`, only upgrade requests whose `Origin` header matches one
    /// of these values are accepted. If `None`, origin validation is
    /// disabled.
    ///
    /// Default: None
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            fragment_size: None,
            subprotocols: Vec::new(),
            close_parent: true,
            guarded: true,
            accept_unmasked_frames: false,
            allow_reserved_bits: false,
            read_buffer_size: 8192,
            write_buffer_size: 8192,
            allowed_origins: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the fragment threshold for outgoing data messages.
    #[must_use]
    pub fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = Some(size);
        self
    }

    /// Set the subprotocols to offer (client) or accept (server).
    #[must_use]
    pub fn with_subprotocols<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subprotocols = names.into_iter().map(Into::into).collect();
        self
    }

    /// Keep the wrapped stream open after the endpoint closes.
    #[must_use]
    pub fn with_close_parent(mut self, close_parent: bool) -> Self {
        self.close_parent = close_parent;
        self
    }

    /// Control whether `upgrade::serve` guards the handler with an
    /// automatic close.
    #[must_use]
    pub fn with_guarded(mut self, guarded: bool) -> Self {
        self.guarded = guarded;
        self
    }

    /// Accept frames with non-zero RSV bits instead of failing the
    /// connection.
    #[must_use]
    pub fn with_allow_reserved_bits(mut self, allow: bool) -> Self {
        self.allow_reserved_bits = allow;
        self
    }

    /// Set read buffer size.
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set write scratch-buffer size.
    #[must_use]
    pub fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Set allowed origins for upgrade requests.
    ///
    /// Only requests with an `Origin` header matching one of these values
    /// will be accepted.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Some(origins);
        self
    }
}
