//! Error types for the event-manager library.

use thiserror::Error;

/// Type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for event-manager
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller passed an argument the registry cannot accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A listener panicked while handling an event.
    ///
    /// Only produced when the dispatcher isolates listener failures; it is
    /// logged and handed to the failure hook, never returned from `publish`.
    #[error("Listener '{key}' ({listener}) panicked while handling {event_type}: {message}")]
    ListenerPanicked {
        /// Key the listener is registered under
        key: String,
        /// Diagnostic name of the listener
        listener: String,
        /// Type name of the event being handled
        event_type: &'static str,
        /// Panic payload, when it was a string
        message: String,
    },
}

impl Error {
    /// Create a new invalid argument error with a custom message
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Check if this error was caused by a bad argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }

    /// Check if this error reports a listener failure
    pub fn is_listener_failure(&self) -> bool {
        matches!(self, Error::ListenerPanicked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_argument("Key for the listener must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid argument: Key for the listener must not be empty"
        );
    }

    #[test]
    fn test_listener_panicked_display() {
        let err = Error::ListenerPanicked {
            key: "audit".to_string(),
            listener: "AuditListener".to_string(),
            event_type: "OrderPlaced",
            message: "boom".to_string(),
        };

        let display = err.to_string();
        assert!(display.contains("'audit'"));
        assert!(display.contains("OrderPlaced"));
        assert!(display.contains("boom"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::invalid_argument("x").is_invalid_argument());
        assert!(!Error::invalid_argument("x").is_listener_failure());

        let err = Error::ListenerPanicked {
            key: "k".into(),
            listener: "l".into(),
            event_type: "E",
            message: String::new(),
        };
        assert!(err.is_listener_failure());
    }
}
