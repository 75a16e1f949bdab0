use std::io::{self, BufRead, BufReader};

use dapwire_frame::FrameWriter;
use dapwire_protocol::Codec;
use tracing::{debug, info};

use crate::cmd::{open_input, FrameArgs};
use crate::exit::{frame_error, io_error, protocol_error, CliResult, SUCCESS};

pub fn run(args: FrameArgs) -> CliResult<i32> {
    let input = BufReader::new(open_input(args.input.as_deref())?);
    let codec = Codec::standard();
    let mut writer = FrameWriter::new(io::stdout().lock());

    let mut framed = 0usize;
    for (number, line) in input.lines().enumerate() {
        let number = number + 1;
        let line = line.map_err(|err| io_error(&format!("line {number}"), err))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let body = if args.no_validate {
            line.as_bytes().to_vec()
        } else {
            let message = codec
                .decode_str(line)
                .map_err(|err| protocol_error(&format!("line {number}"), err))?;
            debug!(line = number, seq = message.seq, tag = message.tag(), "validated");
            if args.canonical {
                codec
                    .encode_vec(&message)
                    .map_err(|err| protocol_error(&format!("line {number}"), err))?
            } else {
                line.as_bytes().to_vec()
            }
        };

        writer
            .write_body(&body)
            .map_err(|err| frame_error("write failed", err))?;
        framed += 1;
    }

    info!(frames = framed, "frame finished");
    Ok(SUCCESS)
}
