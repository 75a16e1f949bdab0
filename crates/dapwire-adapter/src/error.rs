use dapwire_frame::FrameError;
use dapwire_protocol::ProtocolError;

/// Errors that stop the adapter loop or fail a send.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl AdapterError {
    /// Whether the error means the peer went away rather than misbehaved.
    pub fn is_disconnect(&self) -> bool {
        match self {
            AdapterError::Frame(err) => is_disconnect(err),
            AdapterError::Protocol(_) => false,
        }
    }
}

/// End of stream or a closed pipe, as opposed to a protocol violation.
pub(crate) fn is_disconnect(err: &FrameError) -> bool {
    use std::io::ErrorKind;

    match err {
        FrameError::ConnectionClosed { .. } => true,
        FrameError::Io(io) => matches!(
            io.kind(),
            ErrorKind::BrokenPipe
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::UnexpectedEof
        ),
        _ => false,
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
