//! Per-peer session state as reported by the handshake layer.
//!
//! We only display this state; transitions are driven elsewhere.

use std::fmt;

/// Encrypted-session state for a single peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No handshake attempted yet.
    #[default]
    Uninitialized,
    /// Handshake in progress.
    Handshaking,
    /// Session established, traffic is encrypted.
    Established,
    /// Handshake failed.
    Failed,
}

impl SessionState {
    /// Map a handshake-layer label onto a state.
    ///
    /// Unrecognised labels are reported as [`SessionState::Failed`] so an
    /// unknown state is never shown as secure.
    pub fn from_label(label: &str) -> Self {
        match label {
            "uninitialized" => Self::Uninitialized,
            "handshaking" => Self::Handshaking,
            "established" => Self::Established,
            _ => Self::Failed,
        }
    }

    /// Stable lower-case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Handshaking => "handshaking",
            Self::Established => "established",
            Self::Failed => "failed",
        }
    }

    /// Whether traffic with this peer is encrypted.
    pub fn is_established(self) -> bool {
        self == Self::Established
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for state in [
            SessionState::Uninitialized,
            SessionState::Handshaking,
            SessionState::Established,
            SessionState::Failed,
        ] {
            assert_eq!(SessionState::from_label(state.as_str()), state);
        }
    }

    #[test]
    fn unknown_label_is_failed() {
        assert_eq!(SessionState::from_label("rekeying"), SessionState::Failed);
        assert!(!SessionState::from_label("ESTABLISHED").is_established());
    }
}
