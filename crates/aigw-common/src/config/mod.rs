use serde::{Deserialize, Serialize};

pub const DEFAULT_PUBLISHER: &str = "google";
pub const ENV_PUBLISHER: &str = "AIGW_PUBLISHER";
pub const ENV_MODEL_NAME_OVERRIDE: &str = "AIGW_MODEL_NAME_OVERRIDE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required translator config field: {0}")]
    MissingField(&'static str),
}

/// Final, merged translator configuration.
///
/// Merge order: CLI > ENV > defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Vertex AI model publisher, the `{publisher}` path segment.
    pub publisher: String,
    /// Replaces the model named in the request when set.
    pub model_name_override: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            publisher: DEFAULT_PUBLISHER.to_string(),
            model_name_override: None,
        }
    }
}

impl TranslatorConfig {
    /// The model to send upstream: the override if set, else the request's.
    pub fn resolve_model<'a>(&'a self, request_model: &'a str) -> &'a str {
        match self.model_name_override.as_deref() {
            Some(model) if !model.is_empty() => model,
            _ => request_model,
        }
    }
}

/// Optional layer used for merging translator config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatorConfigPatch {
    pub publisher: Option<String>,
    pub model_name_override: Option<String>,
}

impl TranslatorConfigPatch {
    pub fn defaults() -> Self {
        TranslatorConfig::default().into()
    }

    /// Reads the `AIGW_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            publisher: non_empty(ENV_PUBLISHER),
            model_name_override: non_empty(ENV_MODEL_NAME_OVERRIDE),
        }
    }

    pub fn overlay(&mut self, other: TranslatorConfigPatch) {
        if other.publisher.is_some() {
            self.publisher = other.publisher;
        }
        if other.model_name_override.is_some() {
            self.model_name_override = other.model_name_override;
        }
    }

    pub fn into_config(self) -> Result<TranslatorConfig, ConfigError> {
        let publisher = self
            .publisher
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingField("publisher"))?;
        Ok(TranslatorConfig {
            publisher,
            model_name_override: self.model_name_override,
        })
    }
}

impl From<TranslatorConfig> for TranslatorConfigPatch {
    fn from(value: TranslatorConfig) -> Self {
        Self {
            publisher: Some(value.publisher),
            model_name_override: value.model_name_override,
        }
    }
}

#[cfg(test)]
mod tests;
