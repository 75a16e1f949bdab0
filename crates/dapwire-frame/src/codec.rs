use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::{FrameError, Result};

/// The only header with defined behavior.
pub const CONTENT_LENGTH: &str = "Content-Length";

/// Separator between the header block and the body on outgoing frames.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Default maximum body size: 16 MiB.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Default maximum header block size: 8 KiB.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 8 * 1024;

/// One complete message body, exactly as many bytes as its header declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The message body (a UTF-8 JSON document on a well-behaved stream).
    pub body: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    /// View the body as text.
    pub fn as_str(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// True when the body is empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// The total wire size of this frame (header block + body).
    pub fn wire_size(&self) -> usize {
        header_size(self.body.len()) + self.body.len()
    }
}

/// Size of the header block synthesized for a body of `body_len` bytes.
pub fn header_size(body_len: usize) -> usize {
    // "Content-Length: " + digits + "\r\n\r\n"
    CONTENT_LENGTH.len() + 2 + decimal_digits(body_len) + HEADER_TERMINATOR.len()
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Encode a body into the wire format.
///
/// Wire format:
/// ```text
/// Content-Length: <decimal byte count>\r\n
/// \r\n
/// <body, exactly <count> bytes>
/// ```
pub fn encode_frame(body: &[u8], dst: &mut BytesMut) {
    let header = format!("{CONTENT_LENGTH}: {}\r\n\r\n", body.len());
    dst.reserve(header.len() + body.len());
    dst.put_slice(header.as_bytes());
    dst.put_slice(body);
}

/// Position of the decoder within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    /// Scanning for the blank line that ends the header block.
    #[default]
    AwaitingHeader,
    /// Header parsed; waiting until `content_length` body bytes are buffered.
    AwaitingBody { content_length: usize },
}

/// Decode the next non-empty frame from `src`.
///
/// Returns `Ok(None)` when `src` does not hold a complete frame yet. Header
/// bytes are consumed as soon as the header block is complete, so `state`
/// must be carried between calls. Zero-length bodies are consumed and
/// skipped.
pub fn decode_frame(
    state: &mut DecodeState,
    src: &mut BytesMut,
    config: &FrameConfig,
) -> Result<Option<Frame>> {
    loop {
        match *state {
            DecodeState::AwaitingHeader => {
                let Some((header_len, consumed)) = find_header_end(src) else {
                    if src.len() > config.max_header_size {
                        return Err(FrameError::HeaderTooLarge {
                            size: src.len(),
                            max: config.max_header_size,
                        });
                    }
                    return Ok(None); // Need more data
                };

                if consumed > config.max_header_size {
                    return Err(FrameError::HeaderTooLarge {
                        size: consumed,
                        max: config.max_header_size,
                    });
                }

                let content_length = parse_content_length(&src[..header_len])?;
                if content_length > config.max_content_length {
                    return Err(FrameError::PayloadTooLarge {
                        size: content_length,
                        max: config.max_content_length,
                    });
                }

                src.advance(consumed);
                *state = DecodeState::AwaitingBody { content_length };
            }
            DecodeState::AwaitingBody { content_length } => {
                if src.len() < content_length {
                    return Ok(None); // Need more data
                }

                let body = src.split_to(content_length).freeze();
                *state = DecodeState::AwaitingHeader;

                if body.is_empty() {
                    trace!("dropping zero-length frame");
                    continue;
                }
                return Ok(Some(Frame { body }));
            }
        }
    }
}

/// Locate the empty line ending the header block.
///
/// Returns `(header_len, consumed)`: the header lines occupy `buf[..header_len]`
/// and `buf[..consumed]` includes the terminating blank line. Both `\r\n` and
/// bare `\n` line endings are accepted.
fn find_header_end(buf: &[u8]) -> Option<(usize, usize)> {
    let mut line_start = 0;
    for (index, byte) in buf.iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }
        if strip_cr(&buf[line_start..index]).is_empty() {
            return Some((line_start, index + 1));
        }
        line_start = index + 1;
    }
    None
}

fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

fn parse_content_length(block: &[u8]) -> Result<usize> {
    let mut content_length = None;

    for line in block.split(|byte| *byte == b'\n') {
        let line = strip_cr(line);
        if line.is_empty() {
            continue;
        }
        let Some(colon) = line.iter().position(|byte| *byte == b':') else {
            trace!(line = %String::from_utf8_lossy(line), "ignoring malformed header line");
            continue;
        };

        let name = line[..colon].trim_ascii();
        if !name.eq_ignore_ascii_case(CONTENT_LENGTH.as_bytes()) {
            trace!(header = %String::from_utf8_lossy(name), "ignoring unrecognized header");
            continue;
        }

        let raw = &line[colon + 1..];
        let value = std::str::from_utf8(raw)
            .map_err(|_| FrameError::InvalidContentLength(String::from_utf8_lossy(raw).into()))?
            .trim();
        if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(FrameError::InvalidContentLength(value.to_string()));
        }
        let parsed = value
            .parse::<usize>()
            .map_err(|_| FrameError::InvalidContentLength(value.to_string()))?;
        content_length = Some(parsed);
    }

    content_length.ok_or(FrameError::MissingContentLength)
}

/// Configuration for frame decoding and encoding.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum declared body size in bytes. Default: 16 MiB.
    pub max_content_length: usize,
    /// Maximum header block size in bytes. Default: 8 KiB.
    pub max_header_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }
}

/// Incremental frame parser fed with arbitrary chunks of a byte stream.
///
/// Feeding a stream one byte at a time yields the same frames as feeding it
/// in one piece. The decoder never blocks; it reports what is complete and
/// keeps the rest buffered.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    state: DecodeState,
    buf: BytesMut,
    config: FrameConfig,
}

impl FrameDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            state: DecodeState::AwaitingHeader,
            buf: BytesMut::new(),
            config,
        }
    }

    /// Append a chunk and return every frame it completes, in stream order.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Frame>> {
        self.extend(chunk);
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Append a chunk without decoding.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Decode the next complete frame from buffered input, if any.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        decode_frame(&mut self.state, &mut self.buf, &self.config)
    }

    /// True when no partial frame is pending.
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::AwaitingHeader && self.buf.is_empty()
    }

    /// Number of bytes buffered but not yet emitted.
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }

    /// Current position within the frame.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(bodies: &[&str]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for body in bodies {
            encode_frame(body.as_bytes(), &mut buf);
        }
        buf.to_vec()
    }

    fn bodies(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(|frame| frame.as_str().unwrap()).collect()
    }

    #[test]
    fn test_encode_writes_content_length_header() {
        let mut buf = BytesMut::new();
        encode_frame(br#"{"seq":1}"#, &mut buf);
        assert_eq!(buf.as_ref(), b"Content-Length: 9\r\n\r\n{\"seq\":1}");
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let body = br#"{"seq":1,"type":"event","event":"initialized"}"#;
        encode_frame(body, &mut buf);

        let mut state = DecodeState::default();
        let frame = decode_frame(&mut state, &mut buf, &FrameConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(frame.body.as_ref(), body);
        assert!(buf.is_empty());
        assert_eq!(state, DecodeState::AwaitingHeader);
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&b"Content-Length: 5\r\n"[..]);
        let mut state = DecodeState::default();
        let result = decode_frame(&mut state, &mut buf, &FrameConfig::default()).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), 19, "partial header must not be consumed");
    }

    #[test]
    fn test_decode_incomplete_body() {
        let mut buf = BytesMut::from(&b"Content-Length: 5\r\n\r\nhel"[..]);
        let mut state = DecodeState::default();
        let result = decode_frame(&mut state, &mut buf, &FrameConfig::default()).unwrap();
        assert!(result.is_none());
        assert_eq!(state, DecodeState::AwaitingBody { content_length: 5 });
        assert_eq!(buf.as_ref(), b"hel");
    }

    #[test]
    fn test_decode_invalid_content_length() {
        for value in ["abc", "-1", "+5", "", "1 2"] {
            let mut buf = BytesMut::from(format!("Content-Length: {value}\r\n\r\n").as_bytes());
            let mut state = DecodeState::default();
            let result = decode_frame(&mut state, &mut buf, &FrameConfig::default());
            assert!(
                matches!(result, Err(FrameError::InvalidContentLength(_))),
                "value {value:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_decode_missing_content_length() {
        let mut buf = BytesMut::from(&b"Content-Type: application/json\r\n\r\n{}"[..]);
        let mut state = DecodeState::default();
        let result = decode_frame(&mut state, &mut buf, &FrameConfig::default());
        assert!(matches!(result, Err(FrameError::MissingContentLength)));
    }

    #[test]
    fn test_decode_payload_too_large() {
        let mut buf = BytesMut::from(&b"Content-Length: 33554432\r\n\r\n"[..]);
        let mut state = DecodeState::default();
        let result = decode_frame(&mut state, &mut buf, &FrameConfig::default());
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_decode_header_too_large() {
        let config = FrameConfig {
            max_header_size: 32,
            ..FrameConfig::default()
        };
        let mut buf = BytesMut::from(&[b'x'; 64][..]);
        let mut state = DecodeState::default();
        let result = decode_frame(&mut state, &mut buf, &config);
        assert!(matches!(result, Err(FrameError::HeaderTooLarge { .. })));
    }

    #[test]
    fn test_multiple_frames() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&framed(&["first", "second"])).unwrap();
        assert_eq!(bodies(&frames), vec!["first", "second"]);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_empty_body_is_dropped() {
        let mut decoder = FrameDecoder::new();
        let mut wire = b"Content-Length: 0\r\n\r\n".to_vec();
        wire.extend(framed(&["after"]));

        let frames = decoder.feed(&wire).unwrap();
        assert_eq!(bodies(&frames), vec!["after"]);
    }

    #[test]
    fn test_unrecognized_headers_are_ignored() {
        let mut decoder = FrameDecoder::new();
        let wire = b"X-Trace: abc\r\nContent-Type: application/vscode-jsonrpc; charset=utf-8\r\nContent-Length: 2\r\n\r\n{}";
        let frames = decoder.feed(wire).unwrap();
        assert_eq!(bodies(&frames), vec!["{}"]);
    }

    #[test]
    fn test_header_name_is_case_insensitive_and_value_trimmed() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"content-length:   2  \r\n\r\n{}").unwrap();
        assert_eq!(bodies(&frames), vec!["{}"]);
    }

    #[test]
    fn test_bare_newline_header_terminator() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(b"Content-Length: 2\n\n{}").unwrap();
        assert_eq!(bodies(&frames), vec!["{}"]);
    }

    #[test]
    fn test_content_length_counts_bytes_not_chars() {
        let body = r#"{"output":"héllo ✓"}"#;
        assert_ne!(body.len(), body.chars().count());

        let mut decoder = FrameDecoder::new();
        let frames = decoder.feed(&framed(&[body, "{}"])).unwrap();
        assert_eq!(bodies(&frames), vec![body, "{}"]);
    }

    #[test]
    fn test_trailing_bytes_stay_buffered() {
        let mut decoder = FrameDecoder::new();
        let mut wire = framed(&["one"]);
        wire.extend_from_slice(b"Content-Len");

        let frames = decoder.feed(&wire).unwrap();
        assert_eq!(bodies(&frames), vec!["one"]);
        assert_eq!(decoder.buffered_len(), 11);
        assert!(!decoder.is_idle());

        let frames = decoder.feed(b"gth: 3\r\n\r\ntwo").unwrap();
        assert_eq!(bodies(&frames), vec!["two"]);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_byte_at_a_time_matches_single_chunk() {
        let mut wire = b"X-Extra: 1\r\nContent-Length: 0\r\n\r\n".to_vec();
        wire.extend(framed(&[
            r#"{"seq":1,"type":"request","command":"threads"}"#,
            "{}",
            r#"{"seq":2,"type":"event","event":"output","body":{"output":"ü"}}"#,
        ]));

        let mut whole = FrameDecoder::new();
        let expected = whole.feed(&wire).unwrap();
        assert_eq!(expected.len(), 3);

        let mut incremental = FrameDecoder::new();
        let mut collected = Vec::new();
        for byte in &wire {
            collected.extend(incremental.feed(std::slice::from_ref(byte)).unwrap());
        }

        assert_eq!(collected, expected);
        assert!(incremental.is_idle());
    }

    #[test]
    fn test_arbitrary_chunk_sizes_match_single_chunk() {
        let wire = framed(&["alpha", "{\"b\":2}", "gamma-gamma"]);
        let mut whole = FrameDecoder::new();
        let expected = whole.feed(&wire).unwrap();

        for chunk_size in 1..wire.len() {
            let mut decoder = FrameDecoder::new();
            let mut collected = Vec::new();
            for chunk in wire.chunks(chunk_size) {
                collected.extend(decoder.feed(chunk).unwrap());
            }
            assert_eq!(collected, expected, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn test_body_split_across_two_chunks() {
        let body = r#"{"seq":1,"type":"event","event":"initialized"}"#;
        let header = format!("Content-Length: {}\r\n\r\n", body.len());
        let (head, tail) = body.split_at(8);

        let mut decoder = FrameDecoder::new();
        let first = decoder.feed(format!("{header}{head}").as_bytes()).unwrap();
        assert!(first.is_empty());
        assert_eq!(
            decoder.state(),
            DecodeState::AwaitingBody {
                content_length: body.len()
            }
        );

        let second = decoder.feed(tail.as_bytes()).unwrap();
        assert_eq!(bodies(&second), vec![body]);
    }

    #[test]
    fn test_frame_wire_size() {
        let frame = Frame::new(Bytes::from_static(b"test"));
        let mut buf = BytesMut::new();
        encode_frame(&frame.body, &mut buf);
        assert_eq!(frame.wire_size(), buf.len());
        assert_eq!(header_size(1234), "Content-Length: 1234\r\n\r\n".len());
    }
}
