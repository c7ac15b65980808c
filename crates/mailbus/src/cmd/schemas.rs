use mailbus_schema::SchemaRegistry;

use crate::cmd::SchemasArgs;
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{print_event_types, OutputFormat};

pub fn run(args: SchemasArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = SchemaRegistry::from_dir(&args.schemas)
        .map_err(|err| schema_error("failed loading schemas", err))?;

    print_event_types(&registry.event_types(), format);
    Ok(SUCCESS)
}
