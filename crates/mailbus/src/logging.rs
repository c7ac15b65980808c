use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment override for log filtering; takes full `EnvFilter` directives
/// and wins over `--log-level` when set.
pub const LOG_ENV_VAR: &str = "MAILBUS_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Default filter: the chosen level for the mailbus crates, `warn` for
/// everything else (jsonschema and friends get chatty at debug).
fn filter_directives(level: LogLevel) -> String {
    let level = level.as_directive();
    let mut directives = String::from("warn");
    for target in [
        "mailbus",
        "mailbus_envelope",
        "mailbus_schema",
        "mailbus_retry",
        "mailbus_transport",
        "mailbus_pubsub",
    ] {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
