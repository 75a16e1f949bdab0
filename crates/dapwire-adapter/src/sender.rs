use std::io::Write;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dapwire_frame::{FrameConfig, FrameWriter};
use dapwire_protocol::{Codec, Message, ProtocolMessage};
use tracing::debug;

use crate::error::Result;

type SharedWriter = Arc<Mutex<FrameWriter<Box<dyn Write + Send>>>>;

/// Cloneable handle for writing messages to the adapter's output stream.
///
/// Each message is encoded before the output lock is taken and written as
/// one header+body unit under it, so concurrent senders never interleave.
#[derive(Clone)]
pub struct MessageSender {
    writer: SharedWriter,
    codec: Codec,
    next_seq: Arc<AtomicI64>,
}

impl MessageSender {
    pub fn new<W: Write + Send + 'static>(output: W, codec: Codec) -> Self {
        Self::with_config(output, codec, FrameConfig::default(), 1)
    }

    pub fn with_config<W: Write + Send + 'static>(
        output: W,
        codec: Codec,
        frame_config: FrameConfig,
        first_seq: i64,
    ) -> Self {
        let output: Box<dyn Write + Send> = Box::new(output);
        Self {
            writer: Arc::new(Mutex::new(FrameWriter::with_config(output, frame_config))),
            codec,
            next_seq: Arc::new(AtomicI64::new(first_seq)),
        }
    }

    /// Write a message with the `seq` it already carries.
    pub fn send(&self, message: &ProtocolMessage) -> Result<()> {
        let body = self.codec.encode_vec(message)?;

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_body(&body)?;
        drop(writer);

        debug!(
            seq = message.seq,
            kind = %message.kind(),
            tag = message.tag(),
            size = body.len(),
            "sent message"
        );
        Ok(())
    }

    /// Assign the next `seq` to `message` and write it. Returns the `seq` used.
    pub fn send_message(&self, message: impl Into<Message>) -> Result<i64> {
        let seq = self.next_seq();
        self.send(&ProtocolMessage::new(seq, message))?;
        Ok(seq)
    }

    /// Reserve the next outgoing `seq`.
    pub fn next_seq(&self) -> i64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }
}

impl std::fmt::Debug for MessageSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSender")
            .field("next_seq", &self.next_seq.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
