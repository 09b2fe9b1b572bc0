//! Explicit constructor registration for discoverable abstractions.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

/// Result alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Errors produced by service registration and instantiation.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// An implementation identity was registered twice.
    #[error("implementation `{identity}` is already registered for `{abstraction}`")]
    DuplicateIdentity {
        /// The offending identity string.
        identity: String,
        /// Abstraction the identity was registered for.
        abstraction: String,
    },

    /// A manifest referenced an identity with no registered constructor.
    #[error("no constructor registered for implementation `{identity}` of `{abstraction}`")]
    UnknownIdentity {
        /// The unresolvable identity string.
        identity: String,
        /// Abstraction the manifest belongs to.
        abstraction: String,
    },

    /// A constructor failed to produce an instance.
    #[error("failed to construct implementation `{identity}`: {reason}")]
    Construction {
        /// Identity of the implementation that failed.
        identity: String,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl DiscoveryError {
    /// Creates a construction error for the supplied identity.
    #[must_use]
    pub fn construction(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Construction {
            identity: identity.into(),
            reason: reason.into(),
        }
    }
}

type ServiceFactory<T> = Box<dyn Fn() -> DiscoveryResult<Arc<T>> + Send + Sync>;

/// Maps implementation identities of one abstraction to constructors.
///
/// Manifests carry implementation identities as strings; this registry is
/// the type-safe stand-in for "load a class by name and call its
/// zero-argument constructor". Each abstraction owns one registry, named
/// by the abstraction's qualified name so manifests can be located.
pub struct ServiceRegistry<T: ?Sized> {
    abstraction: String,
    factories: HashMap<String, ServiceFactory<T>>,
}

impl<T: ?Sized> ServiceRegistry<T> {
    /// Creates a registry for the abstraction with the supplied qualified name.
    #[must_use]
    pub fn new(abstraction: impl Into<String>) -> Self {
        Self {
            abstraction: abstraction.into(),
            factories: HashMap::new(),
        }
    }

    /// Returns the abstraction's qualified name.
    #[must_use]
    pub fn abstraction(&self) -> &str {
        &self.abstraction
    }

    /// Registers a zero-argument constructor under an implementation identity.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::DuplicateIdentity`] when the identity is
    /// already registered.
    pub fn register<F>(&mut self, identity: impl Into<String>, factory: F) -> DiscoveryResult<()>
    where
        F: Fn() -> DiscoveryResult<Arc<T>> + Send + Sync + 'static,
    {
        let identity = identity.into();
        if self.factories.contains_key(&identity) {
            return Err(DiscoveryError::DuplicateIdentity {
                identity,
                abstraction: self.abstraction.clone(),
            });
        }
        self.factories.insert(identity, Box::new(factory));
        Ok(())
    }

    /// Constructs the implementation registered under the supplied identity.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::UnknownIdentity`] when no constructor is
    /// registered, or [`DiscoveryError::Construction`] when the constructor
    /// fails.
    pub fn instantiate(&self, identity: &str) -> DiscoveryResult<Arc<T>> {
        let factory = self
            .factories
            .get(identity)
            .ok_or_else(|| DiscoveryError::UnknownIdentity {
                identity: identity.to_owned(),
                abstraction: self.abstraction.clone(),
            })?;
        factory()
    }
}

impl<T: ?Sized> std::fmt::Debug for ServiceRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let identities: Vec<_> = self.factories.keys().collect();
        f.debug_struct("ServiceRegistry")
            .field("abstraction", &self.abstraction)
            .field("registered", &identities)
            .finish()
    }
}
