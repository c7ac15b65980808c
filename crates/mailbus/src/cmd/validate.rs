use std::fs;

use mailbus_envelope::Envelope;
use mailbus_schema::{validate_envelope, SchemaRegistry};

use crate::cmd::ValidateArgs;
use crate::exit::{schema_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_validation, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = SchemaRegistry::from_dir(&args.schemas)
        .map_err(|err| schema_error("failed loading schemas", err))?;

    let Some(schema) = registry.get(&args.event_type) else {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "unknown event type {:?}; loaded: {}",
                args.event_type,
                registry.event_types().join(", ")
            ),
        ));
    };

    let input = resolve_input(&args)?;
    let envelope = if args.envelope {
        mailbus_envelope::decode(input.as_bytes())
            .map_err(|err| CliError::new(DATA_INVALID, format!("malformed envelope: {err}")))?
    } else {
        let payload = serde_json::from_str(&input)
            .map_err(|err| CliError::new(USAGE, format!("payload is not valid JSON: {err}")))?;
        Envelope::new(&args.event_type, payload)
    };

    let report = validate_envelope(&envelope, &schema);
    let valid = report.is_valid();
    print_validation(&args.event_type, report.violations(), format);

    Ok(if valid { SUCCESS } else { DATA_INVALID })
}

fn resolve_input(args: &ValidateArgs) -> CliResult<String> {
    if let Some(json) = &args.json {
        return Ok(json.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Err(CliError::new(USAGE, "provide a payload via --json or --file"))
}
