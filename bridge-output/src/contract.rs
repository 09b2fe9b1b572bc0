//! Per-type decode contracts manufactured on first use.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bridge_models::ModelError;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Result alias for structured output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Errors surfaced while producing structured output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The model reply could not be decoded into the requested type.
    #[error("failed to decode reply into `{type_name}`: {reason}")]
    Decode {
        /// Name of the requested output type.
        type_name: &'static str,
        /// Decoder failure detail.
        reason: String,
    },

    /// A contract was asked to decode into a type it was not built for.
    #[error("contract for `{manufactured}` cannot decode `{requested}`")]
    ContractMismatch {
        /// Type the contract was manufactured for.
        manufactured: &'static str,
        /// Type the caller asked for.
        requested: &'static str,
    },

    /// The caller assembled an unusable configuration.
    #[error("invalid structured-output configuration: {reason}")]
    Configuration {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// The model answered with an option id outside the configured set.
    #[error("decision `{id}` is not among the configured options")]
    UnknownOption {
        /// The id the model answered with.
        id: String,
    },

    /// The underlying chat model failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl OutputError {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

/// Decode contract for one output type.
///
/// A contract is manufactured once per type and carries a monomorphized
/// decode function from reply JSON to the concrete value, behind a
/// type-erased signature so contracts of different types share one cache.
pub struct OutputContract {
    type_name: &'static str,
    type_id: TypeId,
    decode: fn(&str) -> OutputResult<Box<dyn Any + Send>>,
}

impl OutputContract {
    fn manufacture<T>() -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        Self {
            type_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            decode: |json| match serde_json::from_str::<T>(json) {
                Ok(value) => Ok(Box::new(value)),
                Err(err) => Err(OutputError::Decode {
                    type_name: type_name::<T>(),
                    reason: err.to_string(),
                }),
            },
        }
    }

    /// Returns the name of the type this contract decodes into.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Decodes one JSON reply into the contract's type.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::ContractMismatch`] when `T` differs from the
    /// manufactured type and [`OutputError::Decode`] when the reply does
    /// not deserialize.
    pub fn decode<T: 'static>(&self, json: &str) -> OutputResult<T> {
        if TypeId::of::<T>() != self.type_id {
            return Err(OutputError::ContractMismatch {
                manufactured: self.type_name,
                requested: type_name::<T>(),
            });
        }

        let boxed = (self.decode)(json)?;
        match boxed.downcast::<T>() {
            Ok(value) => Ok(*value),
            // Unreachable after the TypeId check above.
            Err(_) => Err(OutputError::ContractMismatch {
                manufactured: self.type_name,
                requested: type_name::<T>(),
            }),
        }
    }
}

impl std::fmt::Debug for OutputContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputContract")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Process-lifetime cache of decode contracts, keyed by output type.
///
/// The first caller for a type wins the manufacture under the write lock;
/// every later caller for the same type receives the identical shared
/// contract. Entries are never invalidated.
#[derive(Clone, Debug, Default)]
pub struct OutputSynthesizer {
    contracts: Arc<RwLock<HashMap<TypeId, Arc<OutputContract>>>>,
}

impl OutputSynthesizer {
    /// Creates an empty synthesizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contract for `T`, manufacturing it on first use.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn contract<T>(&self) -> Arc<OutputContract>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let key = TypeId::of::<T>();
        {
            let contracts = self.contracts.read().expect("contract cache poisoned");
            if let Some(contract) = contracts.get(&key) {
                return Arc::clone(contract);
            }
        }

        let mut contracts = self.contracts.write().expect("contract cache poisoned");
        Arc::clone(contracts.entry(key).or_insert_with(|| {
            debug!(type_name = type_name::<T>(), "manufacturing output contract");
            Arc::new(OutputContract::manufacture::<T>())
        }))
    }

    /// Returns the number of manufactured contracts.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contracts.read().expect("contract cache poisoned").len()
    }

    /// Returns whether no contract has been manufactured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
