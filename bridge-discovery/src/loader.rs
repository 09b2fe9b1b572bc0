//! Loader walking the module graph for advertised implementations.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::module::ModuleGraph;
use crate::registry::ServiceRegistry;

/// Path prefix under which service manifests are bundled, followed by the
/// abstraction's qualified name.
pub const SERVICES_LOCATION_PREFIX: &str = "services/";

/// Discovers implementations of an abstraction across the module graph.
///
/// The loader visits the current module and every active module depending
/// on it, reads one manifest per module, deduplicates the advertised
/// identities, and constructs each surviving identity exactly once via the
/// supplied [`ServiceRegistry`]. A broken identity never fails the whole
/// pass; it is logged and skipped. No caching happens across calls.
#[derive(Debug)]
pub struct SpiLoader<'g> {
    graph: &'g ModuleGraph,
    module: String,
}

impl<'g> SpiLoader<'g> {
    /// Creates a loader rooted at the supplied module.
    #[must_use]
    pub fn new(graph: &'g ModuleGraph, module: impl Into<String>) -> Self {
        Self {
            graph,
            module: module.into(),
        }
    }

    /// Loads all implementations of the registry's abstraction advertised
    /// in scope. Returns an empty collection when no manifest exists
    /// anywhere in scope.
    #[must_use]
    pub fn load<T: ?Sized>(&self, registry: &ServiceRegistry<T>) -> Vec<Arc<T>> {
        let identities = self.identities(registry.abstraction());

        identities
            .iter()
            .filter_map(|identity| match registry.instantiate(identity) {
                Ok(instance) => Some(instance),
                Err(err) => {
                    warn!(
                        identity,
                        abstraction = registry.abstraction(),
                        %err,
                        "skipping undiscoverable implementation"
                    );
                    None
                }
            })
            .collect()
    }

    /// Collects deduplicated implementation identities advertised for the
    /// abstraction across all modules in scope.
    #[must_use]
    pub fn identities(&self, abstraction: &str) -> BTreeSet<String> {
        let location = format!("{SERVICES_LOCATION_PREFIX}{abstraction}");
        let mut identities = BTreeSet::new();

        for module in self.graph.scope_of(&self.module) {
            let Some(manifest) = module.resource(&location) else {
                continue;
            };
            debug!(module = module.name(), abstraction, "reading service manifest");
            identities.extend(read_refs(manifest));
        }

        identities
    }
}

fn read_refs(manifest: &str) -> impl Iterator<Item = String> + '_ {
    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleDescriptor;
    use crate::registry::DiscoveryError;

    trait Probe: Send + Sync {
        fn tag(&self) -> &'static str;
    }

    struct Alpha;
    struct Beta;

    impl Probe for Alpha {
        fn tag(&self) -> &'static str {
            "alpha"
        }
    }

    impl Probe for Beta {
        fn tag(&self) -> &'static str {
            "beta"
        }
    }

    const ABSTRACTION: &str = "probe.Probe";

    fn registry() -> ServiceRegistry<dyn Probe> {
        let mut registry = ServiceRegistry::new(ABSTRACTION);
        registry
            .register("probe.Alpha", || Ok(Arc::new(Alpha) as Arc<dyn Probe>))
            .unwrap();
        registry
            .register("probe.Beta", || Ok(Arc::new(Beta)))
            .unwrap();
        registry
    }

    fn manifest_path() -> String {
        format!("{SERVICES_LOCATION_PREFIX}{ABSTRACTION}")
    }

    #[test]
    fn deduplicates_identities_across_dependents() {
        let mut graph = ModuleGraph::new();
        graph.add(ModuleDescriptor::new("core").with_resource(manifest_path(), "probe.Alpha\n"));
        graph.add(
            ModuleDescriptor::new("ext-a")
                .requires("core")
                .with_resource(manifest_path(), "probe.Alpha\nprobe.Beta\n"),
        );
        graph.add(
            ModuleDescriptor::new("ext-b")
                .requires("core")
                .with_resource(manifest_path(), "\nprobe.Beta\n\n"),
        );

        let loaded = SpiLoader::new(&graph, "core").load(&registry());
        let mut tags: Vec<_> = loaded.iter().map(|p| p.tag()).collect();
        tags.sort_unstable();
        assert_eq!(tags, ["alpha", "beta"]);
    }

    #[test]
    fn missing_manifests_yield_empty_set() {
        let mut graph = ModuleGraph::new();
        graph.add(ModuleDescriptor::new("core"));

        let loaded = SpiLoader::new(&graph, "core").load(&registry());
        assert!(loaded.is_empty());
    }

    #[test]
    fn broken_implementations_are_skipped() {
        let mut registry = registry();
        registry
            .register("probe.Broken", || {
                Err(DiscoveryError::construction("probe.Broken", "no dice"))
            })
            .unwrap();

        let mut graph = ModuleGraph::new();
        graph.add(
            ModuleDescriptor::new("core")
                .with_resource(manifest_path(), "probe.Broken\nprobe.Alpha"),
        );

        let loaded = SpiLoader::new(&graph, "core").load(&registry);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].tag(), "alpha");
    }

    #[test]
    fn unregistered_identities_are_skipped() {
        let mut graph = ModuleGraph::new();
        graph.add(
            ModuleDescriptor::new("core")
                .with_resource(manifest_path(), "probe.Ghost\nprobe.Beta"),
        );

        let loaded = SpiLoader::new(&graph, "core").load(&registry());
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].tag(), "beta");
    }

    #[test]
    fn unknown_root_module_loads_nothing() {
        let graph = ModuleGraph::new();
        let loaded = SpiLoader::new(&graph, "missing").load(&registry());
        assert!(loaded.is_empty());
    }
}
