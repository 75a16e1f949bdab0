use clap::{Args, Subcommand};
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use dapwire_frame::DEFAULT_MAX_CONTENT_LENGTH;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod frame;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a captured Content-Length framed stream and print each message.
    Decode(DecodeArgs),
    /// Frame newline-delimited JSON bodies onto stdout.
    Frame(FrameArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Frame(args) => frame::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Framed capture to read. Reads stdin when omitted.
    pub input: Option<PathBuf>,
    /// Largest body accepted, in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_CONTENT_LENGTH)]
    pub max_content_length: usize,
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// NDJSON file with one message body per line. Reads stdin when omitted.
    pub input: Option<PathBuf>,
    /// Frame lines as-is without decoding them first.
    #[arg(long)]
    pub no_validate: bool,
    /// Re-encode each validated message instead of copying the line.
    #[arg(long, conflicts_with = "no_validate")]
    pub canonical: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open `path`, or stdin when no path is given and stdin is not a terminal.
pub(crate) fn open_input(path: Option<&Path>) -> CliResult<Box<dyn Read>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("open {}", path.display()), err))?;
            Ok(Box::new(file))
        }
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(CliError::new(
                    USAGE,
                    "no input: pass a file or pipe a stream on stdin",
                ));
            }
            Ok(Box::new(stdin))
        }
    }
}
