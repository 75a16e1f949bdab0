use crate::message::MessageKind;

/// Why a registered variant could not map its payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The variant requires `arguments`/`body` but the key was absent or `null`.
    #[error("required payload is missing")]
    Missing,

    /// The payload does not match the variant's schema.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The handler was asked to encode a message of a different variant.
    #[error("message does not belong to the registered variant")]
    VariantMismatch,
}

/// Errors raised while decoding or encoding protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The body is not valid JSON.
    #[error("message body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The envelope is missing `seq`, `type`, or its tag field.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope `type` is not request, response, or event.
    #[error("message type {0:?} is not supported")]
    UnsupportedMessageType(String),

    /// No handler is registered for this command or event name.
    #[error("{kind} {tag:?} is not supported")]
    UnsupportedTag { kind: MessageKind, tag: String },

    /// The payload is present but does not fit the registered schema.
    #[error("malformed payload for {tag:?}: {source}")]
    MalformedPayload {
        tag: String,
        #[source]
        source: PayloadError,
    },

    /// An outbound message holds a value JSON cannot represent.
    #[error("cannot encode message: {0}")]
    Encoding(String),
}

impl ProtocolError {
    /// Whether the adapter may answer with an error response and keep going.
    ///
    /// Everything raised while decoding an inbound body is recoverable;
    /// encoding failures belong to the sender.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ProtocolError::Encoding(_))
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
