//! WebSocket endpoint state machine (RFC 6455 Section 7).
//!
//! The closing handshake is symmetric: either side may send the first
//! close frame, the other echoes, and the connection ends when both a
//! close was sent and one was received. The four states track which of
//! the two events have happened; each transition fires exactly once.

/// WebSocket endpoint lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum EndpointState {
    /// Open for data transfer in both directions.
    #[default]
    Open,
    /// We sent a close frame and are waiting for the peer's.
    SentClose,
    /// The peer's close frame arrived before we sent ours.
    ReceivedClose,
    /// Both close frames exchanged (or the stream failed); terminal.
    Closed,
}

impl EndpointState {
    /// Check if data messages may still be sent.
    ///
    /// Sending is allowed until *we* have sent a close: in `ReceivedClose`
    /// the peer will ignore anything after its close frame, but the
    /// protocol still permits us to flush pending data before echoing.
    #[must_use]
    #[inline]
    pub const fn can_send_data(&self) -> bool {
        matches!(self, EndpointState::Open | EndpointState::ReceivedClose)
    }

    /// Check if a close frame may still be sent.
    #[must_use]
    #[inline]
    pub const fn can_send_close(&self) -> bool {
        matches!(self, EndpointState::Open | EndpointState::ReceivedClose)
    }

    /// Check if frames may still be read.
    #[must_use]
    #[inline]
    pub const fn can_receive(&self) -> bool {
        matches!(self, EndpointState::Open | EndpointState::SentClose)
    }

    /// State after our close frame goes out.
    #[must_use]
    pub const fn on_close_sent(self) -> EndpointState {
        match self {
            EndpointState::Open => EndpointState::SentClose,
            EndpointState::ReceivedClose => EndpointState::Closed,
            other => other,
        }
    }

    /// State after the peer's close frame arrives.
    #[must_use]
    pub const fn on_close_received(self) -> EndpointState {
        match self {
            EndpointState::Open => EndpointState::ReceivedClose,
            EndpointState::SentClose => EndpointState::Closed,
            other => other,
        }
    }
}

impl std::fmt::Display for EndpointState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointState::Open => write!(f, "Open"),
            EndpointState::SentClose => write!(f, "SentClose"),
            EndpointState::ReceivedClose => write!(f, "ReceivedClose"),
            EndpointState::Closed => write!(f, "Closed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(EndpointState::default(), EndpointState::Open);
    }

    #[test]
    fn test_close_sent_first() {
        let state = EndpointState::Open.on_close_sent();
        assert_eq!(state, EndpointState::SentClose);
        let state = state.on_close_received();
        assert_eq!(state, EndpointState::Closed);
    }

    #[test]
    fn test_close_received_first() {
        let state = EndpointState::Open.on_close_received();
        assert_eq!(state, EndpointState::ReceivedClose);
        let state = state.on_close_sent();
        assert_eq!(state, EndpointState::Closed);
    }

    #[test]
    fn test_closed_is_terminal() {
        assert_eq!(
            EndpointState::Closed.on_close_sent(),
            EndpointState::Closed
        );
        assert_eq!(
            EndpointState::Closed.on_close_received(),
            EndpointState::Closed
        );
    }

    #[test]
    fn test_can_send_data_in_each_state() {
        assert!(EndpointState::Open.can_send_data());
        assert!(!EndpointState::SentClose.can_send_data());
        assert!(EndpointState::ReceivedClose.can_send_data());
        assert!(!EndpointState::Closed.can_send_data());
    }

    #[test]
    fn test_can_receive_in_each_state() {
        assert!(EndpointState::Open.can_receive());
        assert!(EndpointState::SentClose.can_receive());
        assert!(!EndpointState::ReceivedClose.can_receive());
        assert!(!EndpointState::Closed.can_receive());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(EndpointState::Open.to_string(), "Open");
        assert_eq!(EndpointState::SentClose.to_string(), "SentClose");
        assert_eq!(EndpointState::ReceivedClose.to_string(), "ReceivedClose");
        assert_eq!(EndpointState::Closed.to_string(), "Closed");
    }
}
