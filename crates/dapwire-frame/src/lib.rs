//! Content-Length message framing for debug adapter protocol streams.
//!
//! Every message on the wire is an HTTP-style header block followed by a
//! body of exactly `Content-Length` bytes:
//!
//! ```text
//! Content-Length: 119\r\n
//! \r\n
//! {"seq":1,"type":"request","command":"initialize",...}
//! ```
//!
//! The decoder is a two-state machine that tolerates arbitrary chunk
//! boundaries, so callers never deal with partial reads.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::FrameCodec;
pub use codec::{
    decode_frame, encode_frame, header_size, DecodeState, Frame, FrameConfig, FrameDecoder,
    CONTENT_LENGTH, DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_MAX_HEADER_SIZE,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
