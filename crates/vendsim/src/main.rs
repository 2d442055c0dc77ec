mod cmd;
mod device;
mod events;
mod exit;
mod logging;
mod settings;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "vendsim", version, about = "Vending controller emulator")]
struct Cli {
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

    match cmd::run(cli.command) {
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
    fn parses_serve_subcommand() {
        let cli = Cli::try_parse_from([
            "vendsim",
            "serve",
            "--port",
            "16022",
            "--responses",
            "/tmp/responses",
        ])
        .expect("serve args should parse");

        assert!(matches!(cli.command, Command::Serve(_)));
    }

    #[test]
    fn serve_defaults_to_original_port() {
        let cli = Cli::try_parse_from(["vendsim", "serve"]).expect("serve should parse bare");
        match cli.command {
            Command::Serve(args) => assert_eq!(args.port, 16022),
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn parses_version_subcommand() {
        let cli = Cli::try_parse_from(["vendsim", "version", "--extended"])
            .expect("version args should parse");
        assert!(matches!(cli.command, Command::Version(_)));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = Cli::try_parse_from(["vendsim", "--log-level", "loud", "serve"])
            .expect_err("bad log level should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
