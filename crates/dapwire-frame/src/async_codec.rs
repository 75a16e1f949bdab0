//! `tokio_util::codec` adapter over the frame state machine.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, DecodeState, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Frame codec for `FramedRead` / `FramedWrite`.
#[derive(Debug, Default)]
pub struct FrameCodec {
    state: DecodeState,
    config: FrameConfig,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            state: DecodeState::AwaitingHeader,
            config,
        }
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len > self.config.max_content_length {
            return Err(FrameError::PayloadTooLarge {
                size: len,
                max: self.config.max_content_length,
            });
        }
        Ok(())
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        decode_frame(&mut self.state, src, &self.config)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() && self.state == DecodeState::AwaitingHeader {
            return Ok(None);
        }
        Err(FrameError::ConnectionClosed {
            buffered: src.len(),
        })
    }
}

impl Encoder<Bytes> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, body: Bytes, dst: &mut BytesMut) -> Result<()> {
        self.check_len(body.len())?;
        encode_frame(&body, dst);
        Ok(())
    }
}

impl<'a> Encoder<&'a [u8]> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, body: &'a [u8], dst: &mut BytesMut) -> Result<()> {
        self.check_len(body.len())?;
        encode_frame(body, dst);
        Ok(())
    }
}
