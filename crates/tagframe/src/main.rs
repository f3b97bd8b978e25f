mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "tagframe", version, about = "Framed object link CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "TAGFRAME_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
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
    use crate::cmd::{MessageKind, WireOrder};

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "tagframe",
            "send",
            "/dev/ttyUSB0",
            "--kind",
            "u32",
            "--value",
            "42",
            "--baud",
            "115200",
            "--endianness",
            "big",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.kind, MessageKind::U32);
        assert_eq!(args.link.baud, Some(115_200));
        assert_eq!(args.link.endianness, WireOrder::Big);
        assert_eq!(args.count, 1);
    }

    #[test]
    fn parses_listen_tag_list() {
        let cli = Cli::try_parse_from(["tagframe", "listen", "capture.bin", "--tags", "7,6"])
            .expect("listen args should parse");
        let Command::Listen(args) = cli.command else {
            panic!("expected listen");
        };
        assert_eq!(args.tags, Some(vec![7, 6]));
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = Cli::try_parse_from(["tagframe", "send", "out.bin", "--kind", "u128"])
            .expect_err("unknown kind should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn rejects_out_of_range_tag() {
        let err = Cli::try_parse_from(["tagframe", "listen", "in.bin", "--tags", "256"])
            .expect_err("tag above 255 should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
