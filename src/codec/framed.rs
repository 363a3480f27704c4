//! Frame-level I/O over async byte streams.
//!
//! [`FrameReader`] accumulates wire bytes and yields validated frames;
//! [`FrameWriter`] serializes frames, masking in client mode. The two
//! halves are independent so an endpoint can read and write concurrently.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::connection::Role;
use crate::error::{Error, Result};
use crate::protocol::frame::MAX_HEADER_SIZE;
use crate::protocol::mask::apply_mask_offset;
use crate::protocol::validation::FrameValidator;
use crate::protocol::Frame;

/// Draw a fresh unpredictable mask key.
///
/// RFC 6455 requires client masks to be unpredictable to prevent cache
/// poisoning attacks against intermediaries, so each frame gets its own
/// key from the system CSPRNG.
fn generate_mask() -> Result<[u8; 4]> {
    let mut key = [0u8; 4];
    getrandom::getrandom(&mut key)
        .map_err(|e| Error::Io(format!("entropy source failed: {e}")))?;
    Ok(key)
}

/// Reads frames from an async byte stream.
pub struct FrameReader<R> {
    io: R,
    read_buf: BytesMut,
    validator: FrameValidator,
}

impl<R> FrameReader<R> {
    /// Create a reader for the given role and configuration.
    #[must_use]
    pub fn new(io: R, role: Role, config: &Config) -> Self {
        let validator = FrameValidator::new(role, config.limits.clone())
            .with_accept_unmasked(config.accept_unmasked_frames)
            .with_allow_reserved_bits(config.allow_reserved_bits);
        Self {
            io,
            read_buf: BytesMut::with_capacity(config.read_buffer_size),
            validator,
        }
    }

    /// Release the wrapped stream half.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.io
    }

    /// Validate whatever header prefix is buffered, before the payload is
    /// pulled in. Rejects oversized, wrongly-masked, and reserved-bit
    /// frames without buffering their payloads.
    fn validate_buffered_header(&self) -> Result<()> {
        let buf = &self.read_buf;
        if buf.len() < 2 {
            return Ok(());
        }

        let byte0 = buf[0];
        let byte1 = buf[1];
        let rsv1 = (byte0 & 0x40) != 0;
        let rsv2 = (byte0 & 0x20) != 0;
        let rsv3 = (byte0 & 0x10) != 0;
        let masked = (byte1 & 0x80) != 0;

        let payload_len = match byte1 & 0x7F {
            len @ 0..=125 => Some(len as usize),
            126 if buf.len() >= 4 => Some(u16::from_be_bytes([buf[2], buf[3]]) as usize),
            127 if buf.len() >= 10 => {
                let len = u64::from_be_bytes([
                    buf[2], buf[3], buf[4], buf[5], buf[6], buf[7], buf[8], buf[9],
                ]);
                usize::try_from(len).ok()
            }
            _ => None,
        };

        if let Some(len) = payload_len {
            self.validator
                .validate_incoming(masked, rsv1, rsv2, rsv3, len)?;
        }
        Ok(())
    }
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    /// Read the next frame from the stream.
    ///
    /// # Errors
    ///
    /// - `Error::ConnectionClosed(None)` on clean end-of-stream between
    ///   frames
    /// - `Error::InvalidFrame` if the stream ends mid-frame
    /// - frame validation errors per [`FrameValidator`] and
    ///   [`Frame::validate`]
    /// - `Error::Io` on stream failure
    pub async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if self.read_buf.len() >= 2 {
                self.validate_buffered_header()?;

                match Frame::parse(&self.read_buf) {
                    Ok((frame, consumed)) => {
                        self.read_buf.advance(consumed);
                        frame.validate()?;
                        return Ok(frame);
                    }
                    Err(Error::IncompleteFrame { .. }) => {}
                    Err(e) => return Err(e),
                }
            }

            let n = self.io.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                if self.read_buf.is_empty() {
                    return Err(Error::ConnectionClosed(None));
                }
                return Err(Error::InvalidFrame("stream ended mid-frame".into()));
            }
        }
    }
}

/// Writes frames to an async byte stream.
///
/// Payloads are streamed through a bounded scratch buffer; a frame is
/// never serialized whole in memory. In client mode each frame is masked
/// with a fresh random key while it streams.
pub struct FrameWriter<W> {
    io: W,
    scratch: Vec<u8>,
    role: Role,
}

impl<W> FrameWriter<W> {
    /// Create a writer for the given role and configuration.
    #[must_use]
    pub fn new(io: W, role: Role, config: &Config) -> Self {
        Self {
            io,
            scratch: vec![0u8; config.write_buffer_size.max(MAX_HEADER_SIZE)],
            role,
        }
    }

    /// The role this writer masks for.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Borrow the wrapped stream half.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.io
    }

    /// Release the wrapped stream half.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.io
    }
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Serialize one frame onto the stream.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` on stream failure, or an entropy error when a
    /// client mask key cannot be drawn.
    pub async fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let mask = if self.role.must_mask() {
            Some(generate_mask()?)
        } else {
            None
        };

        let mut header = [0u8; MAX_HEADER_SIZE];
        let header_len = frame.encode_header(&mut header, mask);
        self.io.write_all(&header[..header_len]).await?;

        let mut offset = 0;
        for chunk in frame.payload().chunks(self.scratch.len()) {
            let scratch = &mut self.scratch[..chunk.len()];
            scratch.copy_from_slice(chunk);
            if let Some(key) = mask {
                apply_mask_offset(scratch, key, offset);
            }
            self.io.write_all(scratch).await?;
            offset += chunk.len();
        }

        Ok(())
    }

    /// Flush pending bytes to the stream.
    pub async fn flush(&mut self) -> Result<()> {
        self.io.flush().await?;
        Ok(())
    }

    /// Shut down the write side of the stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.io.shutdown().await?;
        Ok(())
    }
}
