use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use schemabus_service::{ClientConfig, SchemaClient};
use serde_json::Value;

use crate::exit::{client_error, io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod add;
pub mod keys;
pub mod serve;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the schema service on the channel address.
    Serve(ServeArgs),
    /// Register a schema under a key.
    Add(AddArgs),
    /// Validate a JSON document against a registered schema.
    Validate(ValidateArgs),
    /// List registered schema keys.
    Keys(KeysArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, address: &str, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, address),
        Command::Add(args) => add::run(args, address, format),
        Command::Validate(args) => validate::run(args, address, format),
        Command::Keys(args) => keys::run(args, address, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Preload every `<key>.schema.json` file from this directory.
    #[arg(long, value_name = "DIR", env = "SCHEMABUS_SCHEMA_DIR")]
    pub schemas: Option<PathBuf>,
    /// Report at most N violations per document.
    #[arg(long, value_name = "N")]
    pub max_violations: Option<usize>,
}

/// Connection options shared by the client subcommands.
#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Per-request timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

impl ClientArgs {
    pub fn connect(&self, address: &str) -> CliResult<SchemaClient> {
        let config = ClientConfig {
            timeout: Some(parse_duration(&self.timeout)?),
            ..ClientConfig::default()
        };
        SchemaClient::connect_address(address, config)
            .map_err(|err| client_error("connect failed", err))
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Key to register the schema under.
    pub key: String,
    /// Schema document as inline JSON.
    #[arg(long, conflicts_with = "schema_file", required_unless_present = "schema_file")]
    pub schema: Option<String>,
    /// Read the schema document from a file.
    #[arg(long, value_name = "PATH")]
    pub schema_file: Option<PathBuf>,
    /// Replace a schema already registered under the key.
    #[arg(long)]
    pub overwrite: bool,
    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Key of the schema to validate against.
    pub key: String,
    /// Document as inline JSON.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub json: Option<String>,
    /// Read the document from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(flatten)]
    pub client: ClientArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a JSON argument given inline or as a file path.
pub fn json_input(flag: &str, inline: Option<&str>, file: Option<&Path>) -> CliResult<Value> {
    let text = match (inline, file) {
        (Some(text), _) => text.to_string(),
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        (None, None) => return Err(CliError::usage(format!("--{flag} is required"))),
    };
    serde_json::from_str(&text)
        .map_err(|err| CliError::usage(format!("--{flag} is not valid JSON: {err}")))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input:?}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
