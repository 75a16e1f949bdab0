use std::fmt;
use std::io;

use dapwire_frame::FrameError;
use dapwire_protocol::ProtocolError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied | io::ErrorKind::BrokenPipe => {
            FAILURE
        }
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        other if other.is_header_error() => {
            CliError::new(DATA_INVALID, format!("{context}: {other}"))
        }
        FrameError::ConnectionClosed { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    if err.is_recoverable() {
        CliError::new(DATA_INVALID, format!("{context}: {err}"))
    } else {
        CliError::new(INTERNAL, format!("{context}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_errors_are_data_invalid() {
        let err = frame_error("read failed", FrameError::MissingContentLength);
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("read failed: "));

        let err = frame_error("read failed", FrameError::ConnectionClosed { buffered: 3 });
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn io_errors_map_by_kind() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "no such file");
        assert_eq!(frame_error("open", FrameError::Io(missing)).code, FAILURE);

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(io_error("read", other).code, INTERNAL);
    }

    #[test]
    fn protocol_errors_split_on_recoverability() {
        let bad = protocol_error(
            "line 1",
            ProtocolError::UnsupportedMessageType("notify".into()),
        );
        assert_eq!(bad.code, DATA_INVALID);

        let encoding = protocol_error("line 1", ProtocolError::Encoding("NaN".into()));
        assert_eq!(encoding.code, INTERNAL);
    }
}
