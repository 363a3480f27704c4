//! Fragmentation of outgoing WebSocket messages (RFC 6455 Section 5.4).

use crate::protocol::{Frame, OpCode};

/// Iterator producing the frames of one outgoing data message.
///
/// Splits the payload at the configured fragment size: the first frame
/// carries the data opcode with FIN=0, middle frames are continuations
/// with FIN=0, and the final frame carries FIN=1. A payload that fits in
/// one fragment yields a single FIN=1 frame with the data opcode.
pub struct MessageFragmenter<'a> {
    payload: &'a [u8],
    opcode: OpCode,
    fragment_size: usize,
    offset: usize,
    is_first: bool,
}

impl<'a> MessageFragmenter<'a> {
    /// Create a fragmenter for the given payload.
    #[inline]
    #[must_use]
    pub fn new(payload: &'a [u8], opcode: OpCode, fragment_size: usize) -> Self {
        Self {
            payload,
            opcode,
            fragment_size: fragment_size.max(1),
            offset: 0,
            is_first: true,
        }
    }

    /// Remaining bytes still to be framed.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.payload.len().saturating_sub(self.offset)
    }
}

impl Iterator for MessageFragmenter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.payload.len() {
            // An empty message still needs its single FIN=1 frame.
            if self.is_first && self.payload.is_empty() {
                self.is_first = false;
                return Some(Frame::new(true, self.opcode, Vec::new()));
            }
            return None;
        }

        let remaining = self.payload.len() - self.offset;
        let chunk_size = remaining.min(self.fragment_size);
        let is_final = self.offset + chunk_size >= self.payload.len();

        let chunk = self.payload[self.offset..self.offset + chunk_size].to_vec();
        self.offset += chunk_size;

        let opcode = if self.is_first {
            self.is_first = false;
            self.opcode
        } else {
            OpCode::Continuation
        };

        Some(Frame::new(is_final, opcode, chunk))
    }
}
