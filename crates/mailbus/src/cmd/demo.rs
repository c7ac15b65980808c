use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use mailbus_pubsub::{Publisher, Subscriber, TracingReporter};
use mailbus_schema::SchemaRegistry;
use mailbus_transport::{DriverFactory, DriverRole};

use crate::cmd::DemoArgs;
use crate::exit::{publish_error, schema_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_envelope, OutputFormat};

const DEMO_EVENT_TYPE: &str = "ArchiveIngested";

const DEMO_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "archive_url": { "type": "string" },
        "message_count": { "type": "integer", "minimum": 0 }
    },
    "required": ["archive_url"]
}"#;

/// Wires a publisher and a subscriber over one driver backend and pushes a
/// handful of events through, including one that fails validation.
pub fn run(args: DemoArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = Arc::new(
        SchemaRegistry::from_embedded(&[(DEMO_EVENT_TYPE, DEMO_SCHEMA)])
            .map_err(|err| schema_error("failed compiling demo schema", err))?,
    );
    let factory = DriverFactory::with_builtin_drivers();

    let (tx, rx) = mpsc::channel();
    let subscriber = Subscriber::new(registry.clone(), Arc::new(TracingReporter));
    let subscription = subscriber
        .subscribe(
            DEMO_EVENT_TYPE,
            factory
                .create(&args.driver, DriverRole::Consume)
                .map_err(|err| transport_error("failed creating consume driver", err))?,
            Box::new(move |envelope| {
                tx.send(envelope).map_err(|err| err.to_string())?;
                Ok(())
            }),
        )
        .map_err(|err| transport_error("failed subscribing", err))?;

    let mut publisher = Publisher::new(
        registry,
        factory
            .create(&args.driver, DriverRole::Publish)
            .map_err(|err| transport_error("failed creating publish driver", err))?,
    )
    .map_err(|err| publish_error("failed connecting publisher", err))?;

    for n in 0..args.count {
        publisher
            .publish(
                DEMO_EVENT_TYPE,
                serde_json::json!({
                    "archive_url": format!("mbox://lists/demo/2026-{:02}", n + 1),
                    "message_count": n * 100,
                }),
            )
            .map_err(|err| publish_error("publish failed", err))?;
    }

    // One deliberately invalid payload: the publisher must refuse it before
    // any wire write.
    let rejected = publisher
        .publish(DEMO_EVENT_TYPE, serde_json::json!({"message_count": -1}))
        .is_err();

    let mut received = 0u32;
    while received < args.count {
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(envelope) => {
                received += 1;
                print_envelope(&envelope, format);
            }
            Err(_) => break,
        }
    }

    subscription.shutdown();
    publisher
        .disconnect()
        .map_err(|err| publish_error("disconnect failed", err))?;

    println!(
        "published={} received={received} invalid_rejected={rejected}",
        args.count
    );
    Ok(SUCCESS)
}
