//! Shared error types used across sectormap crates.

use thiserror::Error;

/// Errors from the filename codec.
#[derive(Debug, Error, Clone)]
pub enum CodecError {
    /// Token is not valid base-32 in the custom alphabet.
    #[error("Invalid encoded name {token}: {message}")]
    InvalidToken {
        /// The token that failed to decode.
        token: String,
        /// Decoder error message.
        message: String,
    },

    /// Token decoded to bytes that are not valid UTF-8.
    #[error("Encoded name {token} is not UTF-8: {message}")]
    InvalidUtf8 {
        /// The token that was decoded.
        token: String,
        /// Conversion error message.
        message: String,
    },
}
