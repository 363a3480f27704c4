//! Early validation of incoming frames (RFC 6455).
//!
//! These checks run against the raw header, before the payload is
//! buffered, so that oversized or ill-formed frames are rejected without
//! allocating for their payloads:
//! - masking rules per RFC 6455 Section 5.1
//! - RSV bits per Section 5.2
//! - frame size limits

use crate::config::Limits;
use crate::connection::Role;
use crate::error::{Error, Result};

/// Validator for incoming WebSocket frame headers.
#[derive(Debug, Clone)]
pub struct FrameValidator {
    role: Role,
    limits: Limits,
    accept_unmasked_frames: bool,
    allow_reserved_bits: bool,
}

impl FrameValidator {
    /// Create a new frame validator for the given role and limits.
    pub fn new(role: Role, limits: Limits) -> Self {
        Self {
            role,
            limits,
            accept_unmasked_frames: false,
            allow_reserved_bits: false,
        }
    }

    /// Accept unmasked client frames (non-RFC-compliant, for testing).
    #[must_use]
    pub fn with_accept_unmasked(mut self, accept: bool) -> Self {
        self.accept_unmasked_frames = accept;
        self
    }

    /// Accept frames with non-zero RSV bits instead of failing.
    #[must_use]
    pub fn with_allow_reserved_bits(mut self, allow: bool) -> Self {
        self.allow_reserved_bits = allow;
        self
    }

    /// Validate an incoming frame header.
    ///
    /// # Errors
    ///
    /// - `Error::UnmaskedClientFrame` - server received an unmasked frame
    /// - `Error::MaskedServerFrame` - client received a masked frame
    /// - `Error::ReservedBitsSet` - RSV bits set without negotiated extension
    /// - `Error::FrameTooLarge` - frame exceeds the size limit
    pub fn validate_incoming(
        &self,
        masked: bool,
        rsv1: bool,
        rsv2: bool,
        rsv3: bool,
        payload_len: usize,
    ) -> Result<()> {
        self.validate_masking(masked)?;
        self.validate_rsv_bits(rsv1, rsv2, rsv3)?;
        self.limits.check_frame_size(payload_len)
    }

    /// Masking rules per RFC 6455 Section 5.1: servers reject unmasked
    /// client frames, clients reject masked server frames.
    fn validate_masking(&self, masked: bool) -> Result<()> {
        match self.role {
            Role::Server => {
                if !masked && !self.accept_unmasked_frames {
                    return Err(Error::UnmaskedClientFrame);
                }
            }
            Role::Client => {
                if masked {
                    return Err(Error::MaskedServerFrame);
                }
            }
        }
        Ok(())
    }

    /// RSV bits per RFC 6455 Section 5.2: must be 0 unless an extension
    /// defining them was negotiated (none are here).
    fn validate_rsv_bits(&self, rsv1: bool, rsv2: bool, rsv3: bool) -> Result<()> {
        if (rsv1 || rsv2 || rsv3) && !self.allow_reserved_bits {
            return Err(Error::ReservedBitsSet);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_rejects_unmasked_client_frame() {
        let validator = FrameValidator::new(Role::Server, Limits::default());

        let result = validator.validate_incoming(false, false, false, false, 10);

        assert!(matches!(result, Err(Error::UnmaskedClientFrame)));
    }

    #[test]
    fn test_server_accepts_masked_client_frame() {
        let validator = FrameValidator::new(Role::Server, Limits::default());

        assert!(validator
            .validate_incoming(true, false, false, false, 10)
            .is_ok());
    }

    #[test]
    fn test_client_rejects_masked_server_frame() {
        let validator = FrameValidator::new(Role::Client, Limits::default());

        let result = validator.validate_incoming(true, false, false, false, 10);

        assert!(matches!(result, Err(Error::MaskedServerFrame)));
    }

    #[test]
    fn test_client_accepts_unmasked_server_frame() {
        let validator = FrameValidator::new(Role::Client, Limits::default());

        assert!(validator
            .validate_incoming(false, false, false, false, 10)
            .is_ok());
    }

    #[test]
    fn test_server_accepts_unmasked_when_configured() {
        let validator =
            FrameValidator::new(Role::Server, Limits::default()).with_accept_unmasked(true);

        assert!(validator
            .validate_incoming(false, false, false, false, 10)
            .is_ok());
    }

    #[test]
    fn test_rejects_each_rsv_bit() {
        let validator = FrameValidator::new(Role::Server, Limits::default());

        for (rsv1, rsv2, rsv3) in [
            (true, false, false),
            (false, true, false),
            (false, false, true),
            (true, true, true),
        ] {
            let result = validator.validate_incoming(true, rsv1, rsv2, rsv3, 10);
            assert!(matches!(result, Err(Error::ReservedBitsSet)));
        }
    }

    #[test]
    fn test_accepts_rsv_bits_when_allowed() {
        let validator =
            FrameValidator::new(Role::Server, Limits::default()).with_allow_reserved_bits(true);

        assert!(validator
            .validate_incoming(true, true, false, false, 10)
            .is_ok());
    }

    #[test]
    fn test_rejects_frame_exceeding_limit() {
        let limits = Limits::new(1024, 4096, 10, 8192);
        let validator = FrameValidator::new(Role::Server, limits);

        let result = validator.validate_incoming(true, false, false, false, 2048);

        assert!(matches!(
            result,
            Err(Error::FrameTooLarge {
                size: 2048,
                max: 1024
            })
        ));
    }

    #[test]
    fn test_accepts_frame_at_exact_limit() {
        let limits = Limits::new(1024, 4096, 10, 8192);
        let validator = FrameValidator::new(Role::Server, limits);

        assert!(validator
            .validate_incoming(true, false, false, false, 1024)
            .is_ok());
    }

    #[test]
    fn test_masking_checked_before_rsv() {
        // Fail-fast on the masking violation even when RSV is also bad.
        let validator = FrameValidator::new(Role::Server, Limits::default());

        let result = validator.validate_incoming(false, true, false, false, 10);

        assert!(matches!(result, Err(Error::UnmaskedClientFrame)));
    }

    #[test]
    fn test_rsv_checked_before_size() {
        let limits = Limits::new(100, 1000, 10, 8192);
        let validator = FrameValidator::new(Role::Server, limits);

        let result = validator.validate_incoming(true, true, false, false, 200);

        assert!(matches!(result, Err(Error::ReservedBitsSet)));
    }

    #[test]
    fn test_zero_payload_size() {
        let validator = FrameValidator::new(Role::Server, Limits::default());

        assert!(validator
            .validate_incoming(true, false, false, false, 0)
            .is_ok());
    }
}
