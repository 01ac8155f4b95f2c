//! Scroll Engine Error Types
//!
//! Error taxonomy for the smoothing engine. Nothing in here is meant to
//! terminate the process: every variant maps to a [`RecoveryAction`] and the
//! worst case is that raw wheel events pass through unsmoothed.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ScrollError>;

/// Engine error types
#[derive(Error, Debug)]
pub enum ScrollError {
    /// The platform refused to create a display-synchronized tick source
    #[error("Display clock unavailable: {0}")]
    ClockUnavailable(String),

    /// An input tap could not be attached
    #[error("Failed to attach event tap '{name}': {reason}")]
    TapAttachFailed {
        /// Tap name
        name: String,
        /// Platform reason
        reason: String,
    },

    /// A revoked input tap could not be re-enabled
    #[error("Failed to reattach event tap '{name}': {reason}")]
    TapReattachFailed {
        /// Tap name
        name: String,
        /// Platform reason
        reason: String,
    },

    /// Synthetic event injection failed
    #[error("Synthetic scroll emission failed: {0}")]
    EmissionFailed(String),

    /// Modifier keycode outside the known left/right pairs
    #[error("Unknown modifier keycode: 0x{0:02X}")]
    UnknownModifier(u16),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed replay input line
    #[error("Malformed input event on line {line}: {source}")]
    MalformedEvent {
        /// 1-based line number
        line: usize,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error classification for recovery strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Display clock errors
    Clock,
    /// Input tap errors
    Tap,
    /// Output injection errors
    Emission,
    /// Input decoding errors
    Input,
    /// Configuration errors
    Config,
    /// Anything else
    Unknown,
}

/// Classify error for recovery strategy selection
pub fn classify_error(error: &ScrollError) -> ErrorType {
    match error {
        ScrollError::ClockUnavailable(_) => ErrorType::Clock,

        ScrollError::TapAttachFailed { .. } | ScrollError::TapReattachFailed { .. } => {
            ErrorType::Tap
        }

        ScrollError::EmissionFailed(_) => ErrorType::Emission,

        ScrollError::UnknownModifier(_) | ScrollError::MalformedEvent { .. } => ErrorType::Input,

        ScrollError::InvalidConfig(_) => ErrorType::Config,

        ScrollError::Io(_) => ErrorType::Unknown,
    }
}

/// Recovery action to take after error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Stop smoothing and let raw events through for the rest of the session
    PassThrough,
    /// Leave the tap to the watchdog, which re-enables it on its next pass
    Reattach,
    /// Drop this event or tick and carry on
    Skip,
    /// Fail and propagate error
    Fail,
}

/// Determine recovery action for error
pub fn recovery_action(error: &ScrollError) -> RecoveryAction {
    match classify_error(error) {
        ErrorType::Clock => RecoveryAction::PassThrough,
        ErrorType::Tap => RecoveryAction::Reattach,
        ErrorType::Emission | ErrorType::Input => RecoveryAction::Skip,
        ErrorType::Config | ErrorType::Unknown => RecoveryAction::Fail,
    }
}
