mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "dapwire", version, about = "Debug adapter protocol stream tools")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["dapwire", "--format", "json", "decode", "capture.bin"])
            .expect("decode args should parse");

        match cli.command {
            Command::Decode(args) => {
                assert_eq!(args.input.as_deref(), Some(std::path::Path::new("capture.bin")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }

    #[test]
    fn decode_reads_stdin_without_path() {
        let cli = Cli::try_parse_from(["dapwire", "decode"]).expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(ref args) if args.input.is_none()));
    }

    #[test]
    fn parses_frame_flags() {
        let cli = Cli::try_parse_from(["dapwire", "frame", "--no-validate", "bodies.ndjson"])
            .expect("frame args should parse");

        match cli.command {
            Command::Frame(args) => {
                assert!(args.no_validate);
                assert!(!args.canonical);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_canonical_without_validation() {
        let err = Cli::try_parse_from(["dapwire", "frame", "--no-validate", "--canonical"])
            .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = Cli::try_parse_from(["dapwire", "--log-level", "loud", "version"])
            .expect_err("bad level should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
