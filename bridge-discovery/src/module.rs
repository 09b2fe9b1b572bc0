//! Module descriptors and the dependency graph walked during discovery.

use std::collections::{HashMap, HashSet, VecDeque};

/// Release state of a deployed module version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseState {
    /// Current release, fully active.
    Released,
    /// Superseded but still running.
    Deprecated,
    /// Retired.
    Archived,
}

impl ReleaseState {
    /// Returns whether modules in this state take part in discovery.
    /// Only current releases do; deprecated and archived versions keep
    /// serving what they already resolved but advertise nothing new.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Released)
    }
}

/// One deployed module: a name, its release state, the modules it
/// requires, and its bundled resources keyed by path.
#[derive(Clone, Debug)]
pub struct ModuleDescriptor {
    name: String,
    release_state: ReleaseState,
    requires: Vec<String>,
    resources: HashMap<String, String>,
}

impl ModuleDescriptor {
    /// Creates a released module with no dependencies or resources.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            release_state: ReleaseState::Released,
            requires: Vec::new(),
            resources: HashMap::new(),
        }
    }

    /// Sets the release state.
    #[must_use]
    pub fn with_release_state(mut self, state: ReleaseState) -> Self {
        self.release_state = state;
        self
    }

    /// Declares a dependency on another module.
    #[must_use]
    pub fn requires(mut self, module: impl Into<String>) -> Self {
        self.requires.push(module.into());
        self
    }

    /// Bundles a text resource under the supplied path.
    #[must_use]
    pub fn with_resource(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.resources.insert(path.into(), content.into());
        self
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the release state.
    #[must_use]
    pub const fn release_state(&self) -> ReleaseState {
        self.release_state
    }

    /// Returns the names of required modules.
    #[must_use]
    pub fn required_modules(&self) -> &[String] {
        &self.requires
    }

    /// Returns the resource stored under the supplied path, if any.
    #[must_use]
    pub fn resource(&self, path: &str) -> Option<&str> {
        self.resources.get(path).map(String::as_str)
    }
}

/// Graph of deployed modules, indexed by name.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: HashMap<String, ModuleDescriptor>,
}

impl ModuleGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module, replacing any module of the same name.
    pub fn add(&mut self, module: ModuleDescriptor) {
        self.modules.insert(module.name().to_owned(), module);
    }

    /// Returns the module with the supplied name, if deployed.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }

    /// Returns the discovery scope of a module: the module itself plus
    /// every active module that transitively depends on it.
    ///
    /// The result order is unspecified beyond the root coming first.
    #[must_use]
    pub fn scope_of(&self, name: &str) -> Vec<&ModuleDescriptor> {
        let Some(root) = self.modules.get(name) else {
            return Vec::new();
        };

        let mut scope = vec![root];
        let mut visited: HashSet<&str> = HashSet::from([root.name()]);
        let mut queue: VecDeque<&str> = VecDeque::from([root.name()]);

        while let Some(current) = queue.pop_front() {
            for module in self.modules.values() {
                if !module.release_state().is_active()
                    || visited.contains(module.name())
                    || !module.required_modules().iter().any(|req| req == current)
                {
                    continue;
                }
                visited.insert(module.name());
                queue.push_back(module.name());
                scope.push(module);
            }
        }

        scope
    }
}
