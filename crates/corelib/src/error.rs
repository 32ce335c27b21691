//! Error types for the core library.

use crate::ring::Position;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Rejected at construction time; nothing was built.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A server position outside `[0, keyspace_size)`.
    #[error("Position {position} lies outside the keyspace [0, {keyspace_size})")]
    PositionOutOfRange { position: u64, keyspace_size: u64 },

    /// Another server already sits at this position.
    #[error("A server already occupies position {0}")]
    SlotOccupied(Position),

    /// No server sits at this position.
    #[error("No server at position {0}")]
    SlotNotFound(Position),

    /// The ring must keep at least one server for lookups to be defined.
    #[error("Refusing to remove the last server of a ring")]
    LastServer,

    /// Every position of the keyspace already holds a server.
    #[error("Every keyspace position already holds a server")]
    KeyspaceExhausted,
}

impl Error {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::SlotNotFound(Position(42)).to_string(),
            "No server at position 42"
        );
        assert_eq!(
            Error::PositionOutOfRange {
                position: 10,
                keyspace_size: 8
            }
            .to_string(),
            "Position 10 lies outside the keyspace [0, 8)"
        );
        assert_eq!(
            Error::invalid_config("servers must be > 0").to_string(),
            "Invalid configuration: servers must be > 0"
        );
    }
}
