use std::io::{Read, Stdin, Write};

use dapwire_frame::{FrameError, FrameReader};
use dapwire_protocol::{Codec, MessageRegistry, ProtocolError, ProtocolMessage, Response};
use tracing::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::error::{is_disconnect, AdapterError, Result};
use crate::sender::MessageSender;

/// Receives every decoded inbound message, in stream order.
pub trait MessageHandler {
    fn handle(&mut self, message: ProtocolMessage);
}

impl<F: FnMut(ProtocolMessage)> MessageHandler for F {
    fn handle(&mut self, message: ProtocolMessage) {
        self(message)
    }
}

/// Counters returned when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStats {
    /// Non-empty frames read.
    pub frames: u64,
    /// Messages handed to the handler.
    pub dispatched: u64,
    /// Messages that failed to decode.
    pub rejected: u64,
}

enum ReadDisposition {
    Stop,
    Fatal(FrameError),
}

/// Reads framed messages from `R`, decodes them, and hands them to a handler.
///
/// Outbound messages go through the [`MessageSender`] from [`sender`](Self::sender),
/// which may be cloned into the handler or other threads.
pub struct DebugAdapter<R> {
    reader: FrameReader<R>,
    codec: Codec,
    sender: MessageSender,
    config: AdapterConfig,
}

impl DebugAdapter<Stdin> {
    /// Adapter over the process's stdin and stdout.
    pub fn stdio(registry: MessageRegistry) -> Self {
        Self::new(
            std::io::stdin(),
            std::io::stdout(),
            Codec::new(registry),
        )
    }
}

impl<R: Read> DebugAdapter<R> {
    pub fn new<W: Write + Send + 'static>(input: R, output: W, codec: Codec) -> Self {
        Self::with_config(input, output, codec, AdapterConfig::default())
    }

    pub fn with_config<W: Write + Send + 'static>(
        input: R,
        output: W,
        codec: Codec,
        config: AdapterConfig,
    ) -> Self {
        let sender = MessageSender::with_config(
            output,
            codec.clone(),
            config.frame.clone(),
            config.first_seq,
        );
        Self {
            reader: FrameReader::with_config(input, config.frame.clone()),
            codec,
            sender,
            config,
        }
    }

    /// Handle for writing to the output stream.
    pub fn sender(&self) -> MessageSender {
        self.sender.clone()
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Run until the input ends.
    ///
    /// End of input, a truncated final frame, and a reset or closed pipe all
    /// end the loop normally. A malformed header or any other I/O failure is
    /// returned as an error, since the stream cannot be resynchronized.
    pub fn run<H: MessageHandler>(&mut self, mut handler: H) -> Result<AdapterStats> {
        let mut stats = AdapterStats::default();
        info!("adapter loop started");

        loop {
            let frame = match self.reader.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    info!("input closed");
                    break;
                }
                Err(err) => match classify_read_error(err) {
                    ReadDisposition::Stop => break,
                    ReadDisposition::Fatal(err) => return Err(err.into()),
                },
            };
            stats.frames += 1;
            debug!(size = frame.len(), "received frame");

            match self.codec.decode_slice(&frame.body) {
                Ok(message) => {
                    debug!(seq = message.seq, kind = %message.kind(), tag = message.tag(), "dispatching");
                    stats.dispatched += 1;
                    handler.handle(message);
                }
                Err(err) => {
                    stats.rejected += 1;
                    if !self.reject(err)? {
                        break;
                    }
                }
            }
        }

        info!(
            frames = stats.frames,
            dispatched = stats.dispatched,
            rejected = stats.rejected,
            "adapter loop finished"
        );
        Ok(stats)
    }

    /// Report a decode failure. Returns `false` once the output is gone.
    fn reject(&self, err: ProtocolError) -> Result<bool> {
        if !err.is_recoverable() {
            return Err(err.into());
        }
        warn!(error = %err, "failed to decode message");
        if !self.config.reply_to_decode_errors {
            return Ok(true);
        }

        let reply = ProtocolMessage::new(0, Response::error(err.to_string()));
        match self.sender.send(&reply) {
            Ok(()) => Ok(true),
            Err(AdapterError::Frame(send_err)) if is_disconnect(&send_err) => {
                info!(error = %send_err, "output closed");
                Ok(false)
            }
            Err(send_err) => Err(send_err),
        }
    }
}

fn classify_read_error(err: FrameError) -> ReadDisposition {
    if is_disconnect(&err) {
        if let FrameError::ConnectionClosed { buffered } = err {
            warn!(buffered, "input closed inside a frame");
        } else {
            info!(error = %err, "input disconnected");
        }
        return ReadDisposition::Stop;
    }
    ReadDisposition::Fatal(err)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, ErrorKind};
    use std::sync::{Arc, Mutex};

    use dapwire_frame::FrameDecoder;
    use dapwire_protocol::events::{StopReason, StoppedEvent};
    use dapwire_protocol::responses::{Capabilities, RequestResult, ResponseBody};
    use dapwire_protocol::{Event, Message, Request};
    use serde_json::Value;

    use super::*;

    fn framed(bodies: &[&str]) -> Vec<u8> {
        bodies
            .iter()
            .flat_map(|body| format!("Content-Length: {}\r\n\r\n{body}", body.len()).into_bytes())
            .collect()
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn bodies(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            FrameDecoder::new()
                .feed(&bytes)
                .unwrap()
                .iter()
                .map(|frame| serde_json::from_slice(&frame.body).unwrap())
                .collect()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn adapter(input: Vec<u8>) -> (DebugAdapter<Cursor<Vec<u8>>>, SharedBuffer) {
        let output = SharedBuffer::default();
        let adapter = DebugAdapter::new(Cursor::new(input), output.clone(), Codec::standard());
        (adapter, output)
    }

    fn collect(adapter: &mut DebugAdapter<Cursor<Vec<u8>>>) -> (Vec<ProtocolMessage>, AdapterStats) {
        let mut seen = Vec::new();
        let stats = adapter
            .run(|message: ProtocolMessage| seen.push(message))
            .unwrap();
        (seen, stats)
    }

    #[test]
    fn dispatches_in_stream_order() {
        let (mut adapter, output) = adapter(framed(&[
            r#"{"seq":1,"type":"request","command":"initialize","arguments":{"adapterID":"mock"}}"#,
            r#"{"seq":2,"type":"request","command":"configurationDone"}"#,
            r#"{"seq":3,"type":"request","command":"threads"}"#,
        ]));

        let (seen, stats) = collect(&mut adapter);

        let seqs: Vec<i64> = seen.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(seen[2].message, Message::Request(Request::Threads));
        assert_eq!(
            stats,
            AdapterStats {
                frames: 3,
                dispatched: 3,
                rejected: 0
            }
        );
        assert!(output.bodies().is_empty());
    }

    #[test]
    fn unsupported_command_gets_error_response_and_loop_continues() {
        let (mut adapter, output) = adapter(framed(&[
            r#"{"seq":1,"type":"request","command":"bogus"}"#,
            r#"{"seq":2,"type":"request","command":"threads"}"#,
        ]));

        let (seen, stats) = collect(&mut adapter);

        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].seq, 2);
        assert_eq!(stats.rejected, 1);

        let replies = output.bodies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["seq"], 0);
        assert_eq!(replies[0]["type"], "response");
        assert_eq!(replies[0]["command"], "error");
        assert_eq!(replies[0]["request_seq"], 0);
        assert_eq!(replies[0]["success"], false);
        assert!(replies[0]["message"].as_str().unwrap().contains("bogus"));
    }

    #[test]
    fn malformed_json_gets_error_response() {
        let (mut adapter, output) = adapter(framed(&[
            r#"{"seq":1,"#,
            r#"{"seq":2,"type":"event","event":"initialized"}"#,
        ]));

        let (seen, _) = collect(&mut adapter);

        assert_eq!(seen, vec![ProtocolMessage::new(2, Event::Initialized)]);
        assert_eq!(output.bodies()[0]["command"], "error");
    }

    #[test]
    fn reply_can_be_disabled() {
        let output = SharedBuffer::default();
        let mut adapter = DebugAdapter::with_config(
            Cursor::new(framed(&[r#"{"seq":1,"type":"request","command":"bogus"}"#])),
            output.clone(),
            Codec::standard(),
            AdapterConfig {
                reply_to_decode_errors: false,
                ..AdapterConfig::default()
            },
        );

        let stats = adapter.run(|_: ProtocolMessage| {}).unwrap();

        assert_eq!(stats.rejected, 1);
        assert!(output.bodies().is_empty());
    }

    #[test]
    fn zero_length_frames_never_reach_handler() {
        let mut input = b"Content-Length: 0\r\n\r\n".to_vec();
        input.extend(framed(&[r#"{"seq":1,"type":"event","event":"initialized"}"#]));
        input.extend_from_slice(b"Content-Length: 0\r\n\r\n");
        let (mut adapter, output) = adapter(input);

        let (seen, stats) = collect(&mut adapter);

        assert_eq!(seen.len(), 1);
        assert_eq!(stats.frames, 1);
        assert!(output.bodies().is_empty());
    }

    #[test]
    fn empty_input_ends_cleanly() {
        let (mut adapter, _) = adapter(Vec::new());
        let (seen, stats) = collect(&mut adapter);
        assert!(seen.is_empty());
        assert_eq!(stats, AdapterStats::default());
    }

    #[test]
    fn truncated_final_frame_ends_cleanly() {
        let mut input = framed(&[r#"{"seq":1,"type":"event","event":"initialized"}"#]);
        input.extend_from_slice(b"Content-Length: 50\r\n\r\n{\"seq\":2");
        let (mut adapter, _) = adapter(input);

        let (seen, _) = collect(&mut adapter);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn bad_content_length_is_fatal() {
        let (mut adapter, _) = adapter(b"Content-Length: lots\r\n\r\n{}".to_vec());
        let err = adapter.run(|_: ProtocolMessage| {}).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Frame(FrameError::InvalidContentLength(_))
        ));
    }

    #[test]
    fn reset_input_ends_cleanly() {
        struct ResetReader;

        impl Read for ResetReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(ErrorKind::ConnectionReset))
            }
        }

        let mut adapter = DebugAdapter::new(ResetReader, io::sink(), Codec::standard());
        let stats = adapter.run(|_: ProtocolMessage| {}).unwrap();
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn other_io_errors_are_fatal() {
        struct DeniedReader;

        impl Read for DeniedReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(ErrorKind::PermissionDenied))
            }
        }

        let mut adapter = DebugAdapter::new(DeniedReader, io::sink(), Codec::standard());
        let err = adapter.run(|_: ProtocolMessage| {}).unwrap_err();
        assert!(matches!(err, AdapterError::Frame(FrameError::Io(_))));
    }

    #[test]
    fn closed_output_stops_after_decode_failure() {
        struct ClosedPipe;

        impl Write for ClosedPipe {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(ErrorKind::BrokenPipe))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let input = framed(&[
            r#"{"seq":1,"type":"request","command":"bogus"}"#,
            r#"{"seq":2,"type":"request","command":"threads"}"#,
        ]);
        let mut adapter = DebugAdapter::new(Cursor::new(input), ClosedPipe, Codec::standard());

        let stats = adapter.run(|_: ProtocolMessage| {}).unwrap();
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.dispatched, 0);
    }

    #[test]
    fn split_chunks_yield_one_event() {
        let body = r#"{"seq":1,"type":"event","event":"initialized"}"#;
        let wire = format!("Content-Length: {}\r\n\r\n{body}", body.len()).into_bytes();
        let split = wire.len() - body.len() + r#"{"seq":1"#.len();

        struct Chunked {
            chunks: Vec<Vec<u8>>,
        }

        impl Read for Chunked {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.chunks.is_empty() {
                    return Ok(0);
                }
                let chunk = self.chunks.remove(0);
                buf[..chunk.len()].copy_from_slice(&chunk);
                Ok(chunk.len())
            }
        }

        let input = Chunked {
            chunks: vec![wire[..split].to_vec(), wire[split..].to_vec()],
        };
        let mut seen = Vec::new();
        DebugAdapter::new(input, io::sink(), Codec::standard())
            .run(|message: ProtocolMessage| seen.push(message))
            .unwrap();

        assert_eq!(seen, vec![ProtocolMessage::new(1, Event::Initialized)]);
    }

    #[test]
    fn handler_replies_through_sender() {
        let (mut adapter, output) = adapter(framed(&[
            r#"{"seq":1,"type":"request","command":"initialize","arguments":{"adapterID":"mock"}}"#,
        ]));
        let sender = adapter.sender();

        adapter
            .run(|message: ProtocolMessage| {
                let capabilities = Capabilities {
                    supports_configuration_done_request: Some(true),
                    ..Capabilities::default()
                };
                sender
                    .send_message(Response::new(
                        RequestResult::success(message.seq),
                        ResponseBody::Initialize(capabilities),
                    ))
                    .unwrap();
                sender.send_message(Event::Initialized).unwrap();
                sender
                    .send_message(Event::Stopped(StoppedEvent::new(StopReason::Entry)))
                    .unwrap();
            })
            .unwrap();

        let replies = output.bodies();
        assert_eq!(replies.len(), 3);
        assert_eq!(replies[0]["seq"], 1);
        assert_eq!(replies[0]["request_seq"], 1);
        assert_eq!(replies[0]["body"]["supportsConfigurationDoneRequest"], true);
        assert_eq!(replies[1]["event"], "initialized");
        assert_eq!(replies[2]["body"]["reason"], "entry");
    }

    #[test]
    fn handler_trait_is_usable_directly() {
        struct Counter(usize);

        impl MessageHandler for Counter {
            fn handle(&mut self, _message: ProtocolMessage) {
                self.0 += 1;
            }
        }

        let (mut adapter, _) = adapter(framed(&[
            r#"{"seq":1,"type":"event","event":"initialized"}"#,
            r#"{"seq":2,"type":"event","event":"exited","body":{"exitCode":0}}"#,
        ]));
        let mut counter = Counter(0);
        adapter
            .run(|message: ProtocolMessage| counter.handle(message))
            .unwrap();
        assert_eq!(counter.0, 2);
    }
}
