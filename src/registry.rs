//! Source registry
//!
//! Sources are registered explicitly by name. The CLI resolves `--source`
//! against [`BUILTIN_SOURCES`]; an embedding process can build its own
//! [`SourceRegistry`] and register additional sources.

use crate::error::{Error, Result};
use crate::source::{DatadogUsageSource, Source};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Constructor for a registered source
pub type SourceFactory = fn() -> Box<dyn Source>;

/// Source metadata for display
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub streams: &'static [&'static str],
}

#[derive(Clone)]
struct Registration {
    info: SourceInfo,
    factory: SourceFactory,
}

/// Name to factory mapping of available sources
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<&'static str, Registration>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source, replacing any previous registration under the same name
    pub fn register(&mut self, info: SourceInfo, factory: SourceFactory) {
        self.sources.insert(info.name, Registration { info, factory });
    }

    /// Instantiate a source by name
    pub fn create(&self, name: &str) -> Result<Box<dyn Source>> {
        self.sources
            .get(name)
            .map(|registration| (registration.factory)())
            .ok_or_else(|| Error::UnknownSource {
                name: name.to_string(),
            })
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.sources.keys().copied().collect()
    }

    /// Metadata of every registered source
    pub fn info(&self) -> Vec<&SourceInfo> {
        self.sources.values().map(|r| &r.info).collect()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.names())
            .finish()
    }
}

/// Registry holding the sources shipped with this crate
pub fn builtin() -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    registry.register(
        SourceInfo {
            name: "datadog-usage",
            description: "Datadog hourly usage by product family and estimated cost",
            category: "Observability",
            streams: &["hourly_usage_by_product", "estimated_cost"],
        },
        || Box::new(DatadogUsageSource::new()),
    );
    registry
}

/// Built-in sources
pub static BUILTIN_SOURCES: LazyLock<SourceRegistry> = LazyLock::new(builtin);
