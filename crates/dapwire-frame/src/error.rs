/// Errors that can occur while framing or unframing protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The `Content-Length` header value is not a non-negative decimal integer.
    #[error("invalid Content-Length header value: {0:?}")]
    InvalidContentLength(String),

    /// The header block ended without a `Content-Length` header.
    #[error("header block has no Content-Length header")]
    MissingContentLength,

    /// No blank line terminated the header block within the configured limit.
    #[error("header block too large ({size} bytes without terminator, max {max})")]
    HeaderTooLarge { size: usize, max: usize },

    /// The declared body length exceeds the configured maximum.
    #[error("message body too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended in the middle of a frame.
    #[error("connection closed (incomplete frame, {buffered} bytes buffered)")]
    ConnectionClosed { buffered: usize },
}

impl FrameError {
    /// Returns true for errors caused by the peer violating the framing contract.
    ///
    /// There is no safe resynchronization point after one of these.
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidContentLength(_)
                | FrameError::MissingContentLength
                | FrameError::HeaderTooLarge { .. }
                | FrameError::PayloadTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
