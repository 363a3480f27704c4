//! WebSocket frame parsing and serialization (RFC 6455).
//!
//! A frame is the on-wire unit:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |             (16/64)           |
//! |N|V|V|V|       |S|             |   (if payload len==126/127)   |
//! | |1|2|3|       |K|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |                         Masking key (if present)              |
//! +---------------------------------------------------------------+
//! |                     Payload data                              |
//! +---------------------------------------------------------------+
//! ```
//!
//! All multi-byte integers are network byte order.

use crate::error::{Error, Result};
use crate::message::Message;
use crate::protocol::mask::apply_mask;
use crate::protocol::OpCode;

/// Maximum payload size for control frames (RFC 6455 Section 5.5).
pub const MAX_CONTROL_FRAME_PAYLOAD: usize = 125;

/// Largest possible frame header: 2 fixed bytes + 8 extended-length bytes +
/// 4 mask-key bytes.
pub const MAX_HEADER_SIZE: usize = 14;

#[derive(Debug, Clone)]
struct FrameHeader {
    fin: bool,
    rsv1: bool,
    rsv2: bool,
    rsv3: bool,
    opcode: OpCode,
    mask: Option<[u8; 4]>,
    payload_len: usize,
    header_len: usize,
}

/// Parse a frame header from the front of `buf`.
///
/// # Errors
///
/// - `Error::IncompleteFrame` if not enough data is available yet
/// - `Error::ReservedOpcode` / `Error::InvalidOpcode` for bad opcodes
/// - `Error::InvalidFrame` if the 64-bit length has its high bit set
/// - `Error::PayloadTooLargeForPlatform` if the length exceeds `usize`
#[inline]
fn parse_header(buf: &[u8]) -> Result<FrameHeader> {
    if buf.len() < 2 {
        return Err(Error::IncompleteFrame {
            needed: 2 - buf.len(),
        });
    }

    let byte0 = buf[0];
    let byte1 = buf[1];

    let fin = (byte0 & 0x80) != 0;
    let rsv1 = (byte0 & 0x40) != 0;
    let rsv2 = (byte0 & 0x20) != 0;
    let rsv3 = (byte0 & 0x10) != 0;
    let opcode = OpCode::from_u8(byte0 & 0x0F)?;

    let masked = (byte1 & 0x80) != 0;
    let len7 = byte1 & 0x7F;

    // Non-minimal extended encodings are tolerated on receive.
    let (payload_len, header_size) = match len7 {
        0..=125 => (len7 as usize, 2),
        126 => {
            if buf.len() < 4 {
                return Err(Error::IncompleteFrame {
                    needed: 4 - buf.len(),
                });
            }
            (u16::from_be_bytes([buf[2], buf[3]]) as usize, 4)
        }
        127 => {
            if buf.len() < 10 {
                return Err(Error::IncompleteFrame {
                    needed: 10 - buf.len(),
                });
            }
            let len_u64 = u64::from_be_bytes([
                buf[2], buf[3], buf[4], buf[5], buf[6], buf[7], buf[8], buf[9],
            ]);
            if len_u64 & (1 << 63) != 0 {
                return Err(Error::InvalidFrame(
                    "64-bit payload length has high bit set".into(),
                ));
            }
            let len = usize::try_from(len_u64).map_err(|_| Error::PayloadTooLargeForPlatform {
                size: len_u64,
                max: usize::MAX as u64,
            })?;
            (len, 10)
        }
        _ => unreachable!(),
    };

    let total_header_size = if masked { header_size + 4 } else { header_size };

    if buf.len() < total_header_size {
        return Err(Error::IncompleteFrame {
            needed: total_header_size - buf.len(),
        });
    }

    let mask = masked.then(|| {
        [
            buf[header_size],
            buf[header_size + 1],
            buf[header_size + 2],
            buf[header_size + 3],
        ]
    });

    Ok(FrameHeader {
        fin,
        rsv1,
        rsv2,
        rsv3,
        opcode,
        mask,
        payload_len,
        header_len: total_header_size,
    })
}

/// A WebSocket frame as defined in RFC 6455.
///
/// Supports both parsing incoming frames and building outgoing ones. The
/// payload held here is always unmasked; masking is applied on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Final fragment flag. True if this is the last fragment of a message.
    pub fin: bool,
    /// Reserved bit 1. Must be 0 unless an extension is negotiated.
    pub rsv1: bool,
    /// Reserved bit 2. Must be 0 unless an extension is negotiated.
    pub rsv2: bool,
    /// Reserved bit 3. Must be 0 unless an extension is negotiated.
    pub rsv3: bool,
    /// Frame opcode defining the interpretation of the payload data.
    pub opcode: OpCode,
    /// Frame payload data (unmasked).
    payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame with the given parameters.
    #[must_use]
    pub fn new(fin: bool, opcode: OpCode, payload: Vec<u8>) -> Self {
        Self {
            fin,
            rsv1: false,
            rsv2: false,
            rsv3: false,
            opcode,
            payload,
        }
    }

    /// Create a text frame.
    #[must_use]
    pub fn text(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Text, data.into())
    }

    /// Create a binary frame.
    #[must_use]
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Binary, data.into())
    }

    /// Create a close frame with optional status code and reason.
    #[must_use]
    pub fn close(code: Option<u16>, reason: &str) -> Self {
        let payload = if let Some(code) = code {
            let mut data = code.to_be_bytes().to_vec();
            data.extend_from_slice(reason.as_bytes());
            data
        } else {
            Vec::new()
        };
        Self::new(true, OpCode::Close, payload)
    }

    /// Create a ping frame.
    #[must_use]
    pub fn ping(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Ping, data.into())
    }

    /// Create a pong frame.
    #[must_use]
    pub fn pong(data: impl Into<Vec<u8>>) -> Self {
        Self::new(true, OpCode::Pong, data.into())
    }

    /// Get the payload bytes.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the payload.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// RSV bits packed as a 3-bit value (`rsv1` is the high bit).
    #[must_use]
    pub fn rsv(&self) -> u8 {
        (u8::from(self.rsv1) << 2) | (u8::from(self.rsv2) << 1) | u8::from(self.rsv3)
    }

    /// Parse a frame from a buffer.
    ///
    /// Returns the parsed frame and the number of bytes consumed. Masked
    /// payloads are unmasked during the copy.
    ///
    /// # Errors
    ///
    /// - `Error::IncompleteFrame` if not enough data is available yet
    /// - `Error::ReservedOpcode` / `Error::InvalidOpcode` for bad opcodes
    /// - `Error::InvalidFrame` for a 64-bit length with the high bit set
    #[inline]
    pub fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        let header = parse_header(buf)?;

        let total_size = header.header_len.checked_add(header.payload_len).ok_or(
            Error::PayloadTooLargeForPlatform {
                size: header.payload_len as u64,
                max: usize::MAX as u64,
            },
        )?;

        if buf.len() < total_size {
            return Err(Error::IncompleteFrame {
                needed: total_size - buf.len(),
            });
        }

        let mut payload = buf[header.header_len..total_size].to_vec();
        if let Some(mask) = header.mask {
            apply_mask(&mut payload, mask);
        }

        Ok((
            Frame {
                fin: header.fin,
                rsv1: header.rsv1,
                rsv2: header.rsv2,
                rsv3: header.rsv3,
                opcode: header.opcode,
                payload,
            },
            total_size,
        ))
    }

    /// Validate the frame according to RFC 6455.
    ///
    /// Reserved-bit policy is role/configuration dependent and checked
    /// separately on the read path; this covers the unconditional rules.
    ///
    /// # Errors
    ///
    /// - `Error::FragmentedControlFrame` if a control frame has FIN=0
    /// - `Error::ControlFrameTooLarge` if a control payload exceeds 125 bytes
    pub fn validate(&self) -> Result<()> {
        if self.opcode.is_control() {
            if !self.fin {
                return Err(Error::FragmentedControlFrame);
            }
            if self.payload.len() > MAX_CONTROL_FRAME_PAYLOAD {
                return Err(Error::ControlFrameTooLarge(self.payload.len()));
            }
        }
        Ok(())
    }

    /// Encode this frame's header into `buf`, returning the header length.
    ///
    /// The minimal length encoding is always chosen on send. The payload
    /// itself is not written; callers stream it separately (masking with a
    /// running offset when `mask` is present).
    #[must_use]
    pub fn encode_header(&self, buf: &mut [u8; MAX_HEADER_SIZE], mask: Option<[u8; 4]>) -> usize {
        let payload_len = self.payload.len();

        let mut byte0 = self.opcode.as_u8();
        if self.fin {
            byte0 |= 0x80;
        }
        if self.rsv1 {
            byte0 |= 0x40;
        }
        if self.rsv2 {
            byte0 |= 0x20;
        }
        if self.rsv3 {
            byte0 |= 0x10;
        }
        buf[0] = byte0;

        let mut offset = 2;
        let len7 = if payload_len <= 125 {
            payload_len as u8
        } else if payload_len <= u16::MAX as usize {
            buf[2..4].copy_from_slice(&(payload_len as u16).to_be_bytes());
            offset += 2;
            126
        } else {
            buf[2..10].copy_from_slice(&(payload_len as u64).to_be_bytes());
            offset += 8;
            127
        };

        let mut byte1 = len7;
        if let Some(key) = mask {
            byte1 |= 0x80;
            buf[offset..offset + 4].copy_from_slice(&key);
            offset += 4;
        }
        buf[1] = byte1;

        offset
    }

    /// Write the whole frame (header and payload) to a buffer.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFrame` if the buffer is too small.
    pub fn write(&self, buf: &mut [u8], mask: Option<[u8; 4]>) -> Result<usize> {
        let total_size = self.wire_size(mask.is_some());
        if buf.len() < total_size {
            return Err(Error::InvalidFrame(format!(
                "Buffer too small: need {} bytes, have {}",
                total_size,
                buf.len()
            )));
        }

        let mut header = [0u8; MAX_HEADER_SIZE];
        let header_len = self.encode_header(&mut header, mask);
        buf[..header_len].copy_from_slice(&header[..header_len]);

        let payload_end = header_len + self.payload.len();
        buf[header_len..payload_end].copy_from_slice(&self.payload);
        if let Some(key) = mask {
            apply_mask(&mut buf[header_len..payload_end], key);
        }

        Ok(total_size)
    }

    /// Calculate the on-wire size of this frame.
    #[must_use]
    pub fn wire_size(&self, masked: bool) -> usize {
        let payload_len = self.payload.len();
        let extended_len_size = if payload_len <= 125 {
            0
        } else if payload_len <= u16::MAX as usize {
            2
        } else {
            8
        };
        let mask_size = if masked { 4 } else { 0 };
        2 + extended_len_size + mask_size + payload_len
    }
}

impl From<Message> for Frame {
    fn from(message: Message) -> Self {
        match message {
            Message::Text(text) => Frame::text(text.into_bytes()),
            Message::Binary(data) => Frame::binary(data),
            Message::Ping(data) => Frame::ping(data),
            Message::Pong(data) => Frame::pong(data),
            Message::Close(Some(frame)) => {
                Frame::close(Some(frame.code.as_u16()), &frame.reason)
            }
            Message::Close(None) => Frame::close(None, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unmasked_text_frame() {
        // FIN=1, opcode=1 (text), unmasked, payload="Hello"
        let data = &[0x81, 0x05, 0x48, 0x65, 0x6c, 0x6c, 0x6f];
        let (frame, len) = Frame::parse(data).unwrap();
        assert_eq!(len, 7);
        assert!(frame.fin);
        assert!(!frame.rsv1);
        assert!(!frame.rsv2);
        assert!(!frame.rsv3);
        assert_eq!(frame.opcode, OpCode::Text);
        assert_eq!(frame.payload(), b"Hello");
    }

    #[test]
    fn test_parse_masked_text_frame() {
        // FIN=1, opcode=1 (text), masked with [0x37, 0xfa, 0x21, 0x3d]
        let data = &[
            0x81, 0x85, // FIN + Text, MASK + len=5
            0x37, 0xfa, 0x21, 0x3d, // Mask key
            0x7f, 0x9f, 0x4d, 0x51, 0x58, // Masked "Hello"
        ];
        let (frame, len) = Frame::parse(data).unwrap();
        assert_eq!(len, 11);
        assert!(frame.fin);
        assert_eq!(frame.opcode, OpCode::Text);
        assert_eq!(frame.payload(), b"Hello");
    }

    #[test]
    fn test_parse_binary_frame() {
        let data = &[0x82, 0x03, 0x01, 0x02, 0x03];
        let (frame, len) = Frame::parse(data).unwrap();
        assert_eq!(len, 5);
        assert!(frame.fin);
        assert_eq!(frame.opcode, OpCode::Binary);
        assert_eq!(frame.payload(), &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_parse_close_frame() {
        // Close with code 1000
        let data = &[0x88, 0x02, 0x03, 0xe8];
        let (frame, len) = Frame::parse(data).unwrap();
        assert_eq!(len, 4);
        assert!(frame.fin);
        assert_eq!(frame.opcode, OpCode::Close);
        assert_eq!(frame.payload(), &[0x03, 0xe8]);
    }

    #[test]
    fn test_parse_ping_pong_frames() {
        let data = &[0x89, 0x04, 0x70, 0x69, 0x6e, 0x67];
        let (frame, _) = Frame::parse(data).unwrap();
        assert_eq!(frame.opcode, OpCode::Ping);
        assert_eq!(frame.payload(), b"ping");

        let data = &[0x8a, 0x04, 0x70, 0x6f, 0x6e, 0x67];
        let (frame, _) = Frame::parse(data).unwrap();
        assert_eq!(frame.opcode, OpCode::Pong);
        assert_eq!(frame.payload(), b"pong");
    }

    #[test]
    fn test_parse_fragmented_frame() {
        // FIN=0, opcode=1 (text)
        let data = &[0x01, 0x03, 0x48, 0x65, 0x6c];
        let (frame, _) = Frame::parse(data).unwrap();
        assert!(!frame.fin);
        assert_eq!(frame.opcode, OpCode::Text);
        assert_eq!(frame.payload(), b"Hel");
    }

    #[test]
    fn test_parse_continuation_frame() {
        let data = &[0x80, 0x02, 0x6c, 0x6f];
        let (frame, _) = Frame::parse(data).unwrap();
        assert!(frame.fin);
        assert_eq!(frame.opcode, OpCode::Continuation);
        assert_eq!(frame.payload(), b"lo");
    }

    #[test]
    fn test_parse_extended_length_126() {
        let mut data = vec![0x82, 0x7e, 0x01, 0x00]; // len=256
        data.extend(vec![0xab; 256]);

        let (frame, len) = Frame::parse(&data).unwrap();
        assert_eq!(len, 4 + 256);
        assert_eq!(frame.payload().len(), 256);
        assert!(frame.payload().iter().all(|&b| b == 0xab));
    }

    #[test]
    fn test_parse_extended_length_127() {
        let mut data = vec![0x82, 0x7f];
        data.extend(65536u64.to_be_bytes());
        data.extend(vec![0xcd; 65536]);

        let (frame, len) = Frame::parse(&data).unwrap();
        assert_eq!(len, 10 + 65536);
        assert_eq!(frame.payload().len(), 65536);
    }

    #[test]
    fn test_parse_non_minimal_length_accepted() {
        // len=5 encoded with the 16-bit form; tolerated on receive
        let data = &[0x81, 0x7e, 0x00, 0x05, 0x48, 0x65, 0x6c, 0x6c, 0x6f];
        let (frame, len) = Frame::parse(data).unwrap();
        assert_eq!(len, 9);
        assert_eq!(frame.payload(), b"Hello");
    }

    #[test]
    fn test_parse_empty_payload() {
        let data = &[0x81, 0x00];
        let (frame, len) = Frame::parse(data).unwrap();
        assert_eq!(len, 2);
        assert_eq!(frame.payload(), b"");
    }

    #[test]
    fn test_validate_fragmented_control_frame() {
        let mut frame = Frame::ping(b"test".to_vec());
        frame.fin = false;

        let result = frame.validate();
        assert!(matches!(result, Err(Error::FragmentedControlFrame)));
    }

    #[test]
    fn test_validate_control_frame_too_large() {
        let frame = Frame::ping(vec![0u8; 126]);

        let result = frame.validate();
        assert!(matches!(result, Err(Error::ControlFrameTooLarge(126))));
    }

    #[test]
    fn test_parse_reserved_opcodes() {
        // opcode=3 (reserved data range)
        let result = Frame::parse(&[0x83, 0x00]);
        assert!(matches!(result, Err(Error::ReservedOpcode(0x03))));

        // opcode=0xB (reserved control range)
        let result = Frame::parse(&[0x8b, 0x00]);
        assert!(matches!(result, Err(Error::ReservedOpcode(0x0B))));
    }

    #[test]
    fn test_parse_incomplete_header() {
        let result = Frame::parse(&[0x81]);
        assert!(matches!(result, Err(Error::IncompleteFrame { needed: 1 })));
    }

    #[test]
    fn test_parse_incomplete_payload() {
        // len=5 but only 3 payload bytes present
        let result = Frame::parse(&[0x81, 0x05, 0x48, 0x65, 0x6c]);
        assert!(matches!(result, Err(Error::IncompleteFrame { needed: 2 })));
    }

    #[test]
    fn test_parse_incomplete_extended_length() {
        let result = Frame::parse(&[0x82, 0x7e, 0x01]);
        assert!(matches!(result, Err(Error::IncompleteFrame { needed: 1 })));

        let result = Frame::parse(&[0x82, 0x7f, 0x00, 0x00, 0x00]);
        assert!(matches!(result, Err(Error::IncompleteFrame { needed: 5 })));
    }

    #[test]
    fn test_parse_incomplete_mask_key() {
        let result = Frame::parse(&[0x81, 0x85, 0x37, 0xfa]);
        assert!(matches!(result, Err(Error::IncompleteFrame { .. })));
    }

    #[test]
    fn test_parse_length_high_bit_set() {
        let mut data = vec![0x82, 0x7f];
        data.extend(u64::MAX.to_be_bytes());
        let result = Frame::parse(&data);
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_write_unmasked_text_frame() {
        let frame = Frame::text(b"Hello".to_vec());
        let mut buf = vec![0u8; 32];

        let len = frame.write(&mut buf, None).unwrap();

        assert_eq!(len, 7);
        assert_eq!(&buf[..7], &[0x81, 0x05, 0x48, 0x65, 0x6c, 0x6c, 0x6f]);
    }

    #[test]
    fn test_write_masked_text_frame() {
        let frame = Frame::text(b"Hello".to_vec());
        let mask = [0x37, 0xfa, 0x21, 0x3d];
        let mut buf = vec![0u8; 32];

        let len = frame.write(&mut buf, Some(mask)).unwrap();

        assert_eq!(len, 11);
        assert_eq!(buf[0], 0x81);
        assert_eq!(buf[1], 0x85);
        assert_eq!(&buf[2..6], &mask);
        assert_eq!(&buf[6..11], &[0x7f, 0x9f, 0x4d, 0x51, 0x58]);
    }

    #[test]
    fn test_write_extended_lengths() {
        let frame = Frame::binary(vec![0xab; 256]);
        let mut buf = vec![0u8; 512];
        let len = frame.write(&mut buf, None).unwrap();
        assert_eq!(len, 4 + 256);
        assert_eq!(buf[1], 0x7e);
        assert_eq!(&buf[2..4], &[0x01, 0x00]);

        let frame = Frame::binary(vec![0xcd; 65536]);
        let mut buf = vec![0u8; 70000];
        let len = frame.write(&mut buf, None).unwrap();
        assert_eq!(len, 10 + 65536);
        assert_eq!(buf[1], 0x7f);
        assert_eq!(&buf[2..10], &65536u64.to_be_bytes());
    }

    #[test]
    fn test_roundtrip_unmasked() {
        let original = Frame::text(b"WebSocket roundtrip test!".to_vec());
        let mut buf = vec![0u8; 64];

        let written = original.write(&mut buf, None).unwrap();
        let (parsed, consumed) = Frame::parse(&buf[..written]).unwrap();

        assert_eq!(consumed, written);
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_roundtrip_masked() {
        let original = Frame::binary(vec![0x00, 0xff, 0x7a]);
        let mask = [0x12, 0x34, 0x56, 0x78];
        let mut buf = vec![0u8; 64];

        let written = original.write(&mut buf, Some(mask)).unwrap();
        let (parsed, consumed) = Frame::parse(&buf[..written]).unwrap();

        assert_eq!(consumed, written);
        assert_eq!(parsed.payload(), original.payload());
    }

    #[test]
    fn test_write_buffer_too_small() {
        let frame = Frame::text(b"Hello".to_vec());
        let mut buf = vec![0u8; 4];

        let result = frame.write(&mut buf, None);
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_wire_size() {
        let frame = Frame::text(b"Hello".to_vec());
        assert_eq!(frame.wire_size(false), 7);
        assert_eq!(frame.wire_size(true), 11);

        let frame = Frame::binary(vec![0u8; 256]);
        assert_eq!(frame.wire_size(false), 260);
        assert_eq!(frame.wire_size(true), 264);

        let frame = Frame::binary(vec![0u8; 65536]);
        assert_eq!(frame.wire_size(false), 65546);
        assert_eq!(frame.wire_size(true), 65550);
    }

    #[test]
    fn test_encode_header_matches_write() {
        let frame = Frame::binary(vec![0u8; 300]);
        let mask = [1, 2, 3, 4];

        let mut header = [0u8; MAX_HEADER_SIZE];
        let header_len = frame.encode_header(&mut header, Some(mask));

        let mut whole = vec![0u8; frame.wire_size(true)];
        frame.write(&mut whole, Some(mask)).unwrap();

        assert_eq!(&whole[..header_len], &header[..header_len]);
    }

    #[test]
    fn test_close_frame_with_reason() {
        let frame = Frame::close(Some(1000), "Normal closure");
        assert_eq!(frame.opcode, OpCode::Close);
        assert!(frame.fin);

        let payload = frame.payload();
        assert_eq!(u16::from_be_bytes([payload[0], payload[1]]), 1000);
        assert_eq!(&payload[2..], b"Normal closure");
    }

    #[test]
    fn test_parse_rsv_bits() {
        // 0xc1 = FIN + RSV1 + Text
        let data = &[0xc1, 0x00];
        let (frame, _) = Frame::parse(data).unwrap();
        assert!(frame.rsv1);
        assert!(!frame.rsv2);
        assert!(!frame.rsv3);
        assert_eq!(frame.rsv(), 0b100);
    }

    #[test]
    fn test_from_message() {
        let frame = Frame::from(Message::text("hi"));
        assert_eq!(frame.opcode, OpCode::Text);
        assert_eq!(frame.payload(), b"hi");

        let frame = Frame::from(Message::close(crate::CloseCode::Normal, "bye"));
        assert_eq!(frame.opcode, OpCode::Close);
        assert_eq!(&frame.payload()[..2], &1000u16.to_be_bytes());
        assert_eq!(&frame.payload()[2..], b"bye");

        let frame = Frame::from(Message::Close(None));
        assert_eq!(frame.opcode, OpCode::Close);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_max_control_frame_payload() {
        let frame = Frame::ping(vec![0u8; 125]);
        assert!(frame.validate().is_ok());
    }
}
