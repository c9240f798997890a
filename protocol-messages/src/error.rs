//! Decode errors for protocol messages

use thiserror::Error;

/// Result type for message decoding
pub type Result<T> = std::result::Result<T, MessageError>;

/// Errors raised while decoding a raw payload into a typed message
///
/// All variants are decode-time failures: the payload is malformed and the
/// caller must fix it before resubmitting.
#[derive(Error, Debug)]
pub enum MessageError {
    /// Payload carries no `@type` discriminator
    #[error("payload has no @type discriminator")]
    MissingType,

    /// `@type` discriminator is not part of the protocol vocabulary
    /// accepted by the receiving endpoint
    #[error("unknown message @type: {0}")]
    UnknownType(String),

    /// Discriminator matched but a required field is missing, has the
    /// wrong shape, or holds an invalid enum value
    #[error("malformed {kind}: {source}")]
    Malformed {
        /// Message type being decoded
        kind: &'static str,
        /// Underlying field-level failure
        #[source]
        source: serde_json::Error,
    },
}
