//! Channel errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Channel not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection timed out after {0} ms")]
    Timeout(u64),

    #[error("Channel disconnected")]
    Disconnected,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid message: {0}")]
    Decode(String),
}

impl ChannelError {
    /// Whether the error means the underlying connection is gone.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChannelError::Decode(_))
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(e: serde_json::Error) -> Self {
        ChannelError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_error() {
        let err = ChannelError::NotConnected;
        assert!(err.to_string().contains("not connected"));
        assert!(err.is_terminal());
    }

    #[test]
    fn test_connection_failed_error() {
        let err = ChannelError::ConnectionFailed("refused".to_string());
        let display = err.to_string();
        assert!(display.contains("Connection failed"));
        assert!(display.contains("refused"));
    }

    #[test]
    fn test_timeout_error() {
        let err = ChannelError::Timeout(10_000);
        assert!(err.to_string().contains("10000"));
    }

    #[test]
    fn test_decode_error_is_not_terminal() {
        let err = ChannelError::Decode("unknown variant `navigate`".to_string());
        assert!(!err.is_terminal());
        assert!(err.to_string().contains("navigate"));
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ChannelError::from(serde_err);
        assert!(matches!(err, ChannelError::Decode(_)));
    }

    #[test]
    fn test_all_error_variants() {
        let errors = vec![
            ChannelError::NotConnected,
            ChannelError::ConnectionFailed("a".to_string()),
            ChannelError::Timeout(1),
            ChannelError::Disconnected,
            ChannelError::SendFailed("b".to_string()),
            ChannelError::Decode("c".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
