//! Provider SPI and the factory selecting an active backend.

use std::sync::Arc;

use bridge_config::AiSettings;
use bridge_discovery::{ServiceRegistry, SpiLoader};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::{ChatModel, ModelError, ModelResult};

/// Qualified abstraction name under which providers advertise themselves.
pub const PROVIDER_ABSTRACTION: &str = "flowbridge.models.ChatModelProvider";

/// Resolved options handed to a provider when building a model.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl ModelOptions {
    /// Creates empty options; the provider applies its defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies model name, endpoint, and credential from the settings snapshot.
    #[must_use]
    pub fn from_settings(settings: &AiSettings) -> Self {
        Self {
            model: settings.model().map(str::to_owned),
            base_url: settings.base_url().map(str::to_owned),
            api_key: settings.api_key().map(str::to_owned),
            temperature: None,
        }
    }

    /// Sets the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the endpoint base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the provider credential.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Returns the model name, if set.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Returns the endpoint base URL, if set.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the provider credential, if set.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the sampling temperature, if set.
    #[must_use]
    pub const fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

/// A pluggable chat-model backend, discovered through service manifests.
pub trait ChatModelProvider: Send + Sync {
    /// Returns the provider name used for selection, e.g. `OpenAI`.
    fn name(&self) -> &str;

    /// Builds a model instance from the supplied options.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Configuration`] when the options are
    /// insufficient for this backend.
    fn setup(&self, options: &ModelOptions) -> ModelResult<Arc<dyn ChatModel>>;
}

/// Selects and instantiates chat-model backends by name or configuration.
#[derive(Debug)]
pub struct ChatModelFactory<'g> {
    loader: SpiLoader<'g>,
    registry: ServiceRegistry<dyn ChatModelProvider>,
}

impl<'g> ChatModelFactory<'g> {
    /// Provider chosen when the configuration names none.
    pub const FALLBACK_PROVIDER: &'static str = "OpenAI";

    /// Creates a factory discovering providers through the supplied loader.
    #[must_use]
    pub fn new(loader: SpiLoader<'g>, registry: ServiceRegistry<dyn ChatModelProvider>) -> Self {
        Self { loader, registry }
    }

    /// Returns all providers deployed in scope. Re-discovers on every call.
    #[must_use]
    pub fn providers(&self) -> Vec<Arc<dyn ChatModelProvider>> {
        self.loader.load(&self.registry)
    }

    /// Returns the provider with the supplied name, if deployed.
    #[must_use]
    pub fn create(&self, name: &str) -> Option<Arc<dyn ChatModelProvider>> {
        self.providers()
            .into_iter()
            .find(|provider| provider.name() == name)
    }

    /// Builds a model from the configured default provider.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownProvider`] when the configured name
    /// matches no deployed provider, or propagates the provider's own
    /// setup failure.
    pub fn create_model(
        &self,
        settings: &AiSettings,
        options: &ModelOptions,
    ) -> ModelResult<Arc<dyn ChatModel>> {
        let vendor = settings
            .default_provider()
            .unwrap_or(Self::FALLBACK_PROVIDER);
        debug!(provider = vendor, "building chat model");

        let provider = self
            .create(vendor)
            .ok_or_else(|| ModelError::UnknownProvider {
                name: vendor.to_owned(),
            })?;
        provider.setup(options)
    }
}
