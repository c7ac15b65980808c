use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod demo;
pub mod schemas;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a payload or envelope against a schema directory.
    Validate(ValidateArgs),
    /// List the event types loaded from a schema directory.
    Schemas(SchemasArgs),
    /// Run an end-to-end publish/subscribe round trip in-process.
    Demo(DemoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, format),
        Command::Schemas(args) => schemas::run(args, format),
        Command::Demo(args) => demo::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema directory (one `<EventType>.schema.json` per event type).
    #[arg(long, value_name = "DIR")]
    pub schemas: PathBuf,
    /// Event type to validate against.
    #[arg(long, short = 'e', value_name = "TYPE")]
    pub event_type: String,
    /// JSON payload.
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read the JSON payload from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Treat the input as a full envelope document rather than a bare payload.
    #[arg(long)]
    pub envelope: bool,
}

#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Schema directory to load.
    #[arg(long, value_name = "DIR")]
    pub schemas: PathBuf,
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Transport driver to run the demo over.
    #[arg(long, default_value = "memory")]
    pub driver: String,
    /// Number of events to publish.
    #[arg(long, default_value = "3")]
    pub count: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
