use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;

pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the controller emulator server.
    Serve(ServeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// TCP port to listen on.
    #[arg(long, short = 'p', default_value = "16022")]
    pub port: u16,

    /// Directory of canned `<command>.json` reply payloads.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub responses: PathBuf,

    /// Device settings file.
    #[arg(long, value_name = "FILE", default_value = "settings.json")]
    pub settings: PathBuf,

    /// Per-acknowledgment wait window (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub ack_timeout: String,

    /// Disable the stdin door-event trigger.
    #[arg(long)]
    pub no_stdin_events: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
