//! Async relay: reads a framed stream on stdin, checks every message against
//! the standard catalog, and writes the valid ones back out re-encoded.
//!
//! Run with:
//!   cargo run --features cli -- frame requests.ndjson \
//!     | cargo run --example async-relay --features async \
//!     | cargo run --features cli -- decode --format pretty

use dapwire::frame::FrameCodec;
use dapwire::protocol::Codec;
use futures_util::{SinkExt, StreamExt};
use tokio_util::codec::{FramedRead, FramedWrite};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let codec = Codec::standard();
    let mut input = FramedRead::new(tokio::io::stdin(), FrameCodec::new());
    let mut output = FramedWrite::new(tokio::io::stdout(), FrameCodec::new());

    let mut relayed = 0u64;
    let mut dropped = 0u64;
    while let Some(frame) = input.next().await {
        let frame = frame?;
        match codec.decode_slice(&frame.body) {
            Ok(message) => {
                let body = codec.encode_vec(&message)?;
                output.send(body.as_slice()).await?;
                relayed += 1;
            }
            Err(err) => {
                eprintln!("dropping message: {err}");
                dropped += 1;
            }
        }
    }

    eprintln!("relayed {relayed} messages, dropped {dropped}");
    Ok(())
}
