use std::collections::HashMap;

use crate::error::{Result, TransportError};
use crate::memory::MemoryBroker;
use crate::noop::NoopTransport;
use crate::traits::TransportDriver;

/// Which side of the bus a connection serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverRole {
    Publish,
    Consume,
}

/// Constructor for one driver backend.
pub type DriverConstructor =
    Box<dyn Fn(DriverRole) -> Result<Box<dyn TransportDriver>> + Send + Sync>;

/// Registry mapping a configured driver name to its constructor.
///
/// Resolution happens once at service startup; an unknown name is an explicit
/// error there, not a runtime surprise deep in a publish path.
pub struct DriverFactory {
    constructors: HashMap<String, DriverConstructor>,
}

impl DriverFactory {
    /// Empty factory; callers register every backend themselves.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Factory with the built-in backends registered: `"memory"` (one shared
    /// in-process broker per factory) and `"noop"`.
    pub fn with_builtin_drivers() -> Self {
        let mut factory = Self::new();

        let broker = MemoryBroker::new();
        factory.register(
            "memory",
            Box::new(move |role| {
                Ok(match role {
                    DriverRole::Publish => Box::new(broker.publisher()),
                    DriverRole::Consume => Box::new(broker.subscriber()),
                })
            }),
        );
        factory.register(
            "noop",
            Box::new(|_role| Ok(Box::new(NoopTransport::new()) as Box<dyn TransportDriver>)),
        );

        factory
    }

    /// Register (or replace) a backend under `name`.
    pub fn register(&mut self, name: impl Into<String>, constructor: DriverConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Construct an unconnected driver for `name`.
    pub fn create(&self, name: &str, role: DriverRole) -> Result<Box<dyn TransportDriver>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| TransportError::UnknownDriver(name.to_string()))?;
        constructor(role)
    }

    /// Sorted names of registered backends.
    pub fn driver_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverFactory {
    fn default() -> Self {
        Self::with_builtin_drivers()
    }
}
