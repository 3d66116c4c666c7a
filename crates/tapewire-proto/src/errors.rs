//! Protocol error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding or decoding frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Line did not contain the three `|`-separated fields.
    #[error("malformed frame: expected 3 fields, found {fields}")]
    MalformedFrame {
        /// Number of fields actually present
        fields: usize,
    },

    /// A field holds a character that would corrupt the framing.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Encoded frame exceeds [`crate::MAX_FRAME_LEN`].
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Encoded size in bytes
        size: usize,
        /// Maximum allowed size
        max: usize,
    },
}
