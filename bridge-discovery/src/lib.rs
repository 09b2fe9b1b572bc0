//! Manifest-based discovery of service implementations.
//!
//! Implementations of an abstraction are advertised through manifest
//! resources shipped inside modules, one resource per abstraction per
//! module. The loader walks the current module plus every module that
//! depends on it and collects all advertised implementations without
//! compile-time linkage to any of them.

#![warn(missing_docs, clippy::pedantic)]

mod loader;
mod module;
mod registry;

/// Location convention and loader walking the module graph.
pub use loader::{SERVICES_LOCATION_PREFIX, SpiLoader};
/// Module descriptors and the dependency graph between them.
pub use module::{ModuleDescriptor, ModuleGraph, ReleaseState};
/// Explicit registration of implementation constructors.
pub use registry::{DiscoveryError, DiscoveryResult, ServiceRegistry};
