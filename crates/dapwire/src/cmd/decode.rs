use dapwire_frame::{FrameConfig, FrameReader};
use dapwire_protocol::Codec;
use tracing::{debug, info, warn};

use crate::cmd::{open_input, DecodeArgs};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{MessageRecord, OutputFormat, RecordPrinter};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let input = open_input(args.input.as_deref())?;
    let config = FrameConfig {
        max_content_length: args.max_content_length,
        ..FrameConfig::default()
    };
    let mut reader = FrameReader::with_config(input, config);
    let codec = Codec::standard();
    let mut printer = RecordPrinter::new(format);

    let mut index = 0usize;
    let mut failed = 0usize;
    loop {
        let frame = match reader.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(err) => {
                // Nothing after a broken header can be trusted; show what decoded so far.
                printer.finish();
                return Err(frame_error(&format!("frame {index}"), err));
            }
        };

        let mut record = MessageRecord::from_body(index, &frame.body);
        match codec.decode_slice(&frame.body) {
            Ok(message) => {
                debug!(
                    index,
                    seq = message.seq,
                    kind = %message.kind(),
                    tag = message.tag(),
                    "decoded message"
                );
                record.ok = true;
                record.seq = Some(message.seq);
                record.kind = Some(message.kind().as_str());
                record.tag = Some(message.tag().to_string());
            }
            Err(err) => {
                warn!(index, error = %err, "message rejected");
                failed += 1;
                record.error = Some(err.to_string());
            }
        }
        printer.print(&record);
        index += 1;
    }

    printer.finish();
    info!(messages = index, failed, "decode finished");

    if failed > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{failed} of {index} messages failed to decode"),
        ));
    }
    Ok(SUCCESS)
}
