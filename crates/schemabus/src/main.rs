mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use schemabus_wire::DEFAULT_ADDRESS;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "schemabus", version, about = "JSON Schema registry and validation service")]
struct Cli {
    /// Channel address: a bare name under the runtime dir, or a socket path.
    #[arg(
        long,
        value_name = "ADDRESS",
        env = "SCHEMABUS_ADDRESS",
        default_value = DEFAULT_ADDRESS,
        global = true
    )]
    address: String,

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
    match cmd::run(cli.command, &cli.address, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
