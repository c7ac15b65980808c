use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use mailbus_envelope::Envelope;
use mailbus_schema::Violation;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    event_type: &'a str,
    valid: bool,
    violations: Vec<ViolationOutput<'a>>,
}

#[derive(Serialize)]
struct ViolationOutput<'a> {
    path: &'a str,
    message: &'a str,
}

pub fn print_validation(event_type: &str, violations: &[Violation], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ValidationOutput {
                event_type,
                valid: violations.is_empty(),
                violations: violations
                    .iter()
                    .map(|v| ViolationOutput {
                        path: &v.path,
                        message: &v.message,
                    })
                    .collect(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            if violations.is_empty() {
                println!("{event_type}: valid");
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PATH", "MESSAGE"]);
            for violation in violations {
                table.add_row(vec![violation.path.clone(), violation.message.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if violations.is_empty() {
                println!("{event_type}: valid");
                return;
            }
            println!("{event_type}: {} violation(s)", violations.len());
            for violation in violations {
                println!("  {violation}");
            }
        }
    }
}

#[derive(Serialize)]
struct EventTypesOutput<'a> {
    event_types: &'a [String],
    count: usize,
}

pub fn print_event_types(event_types: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EventTypesOutput {
                event_types,
                count: event_types.len(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT TYPE"]);
            for event_type in event_types {
                table.add_row(vec![event_type.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for event_type in event_types {
                println!("{event_type}");
            }
        }
    }
}

pub fn print_envelope(envelope: &Envelope, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(envelope).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT TYPE", "EVENT ID", "TIMESTAMP", "PAYLOAD"])
                .add_row(vec![
                    envelope.event_type.clone(),
                    envelope.event_id.clone(),
                    envelope.timestamp.to_rfc3339(),
                    envelope.payload.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} id={} at={} payload={}",
                envelope.event_type,
                envelope.event_id,
                envelope.timestamp.to_rfc3339(),
                envelope.payload
            );
        }
    }
}
