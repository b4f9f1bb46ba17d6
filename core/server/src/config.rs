// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Server configuration, loaded once from a YAML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tram_protocol::{FormatRegistry, SerializationFormat};

use crate::errors::ServerError;
use crate::telemetry::TracingConfiguration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// When set, 400/500 bodies and INTERNAL_ERROR exceptions carry
    /// server-side traces. Keep off outside development.
    #[serde(default)]
    pub verbose_responses: bool,

    #[serde(default)]
    pub formats: FormatsConfig,

    #[serde(default)]
    pub tracing: TracingConfiguration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            verbose_responses: false,
            formats: FormatsConfig::default(),
            tracing: TracingConfiguration::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_yaml(contents: &str) -> Result<Self, ServerError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServerError> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

/// The allowed serialization formats, default first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsConfig {
    #[serde(default = "default_format")]
    pub default: SerializationFormat,

    #[serde(default = "all_formats")]
    pub others: Vec<SerializationFormat>,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self {
            default: default_format(),
            others: all_formats(),
        }
    }
}

impl FormatsConfig {
    pub fn registry(&self) -> FormatRegistry {
        FormatRegistry::new(self.default, self.others.iter().copied())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_format() -> SerializationFormat {
    SerializationFormat::Binary
}

fn all_formats() -> Vec<SerializationFormat> {
    SerializationFormat::values().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_an_empty_document() {
        let config = ServerConfig::from_yaml("{}").unwrap();
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert!(!config.verbose_responses);
        assert_eq!(config.formats.default, SerializationFormat::Binary);
        assert_eq!(
            config.formats.registry().allowed(),
            &[SerializationFormat::Binary, SerializationFormat::Compact]
        );
    }

    #[test]
    fn formats_section_overrides_the_registry() {
        let config = ServerConfig::from_yaml(
            "listen: 0.0.0.0:9090\nformats:\n  default: compact\n  others: []\n",
        )
        .unwrap();
        assert_eq!(config.listen, "0.0.0.0:9090");
        let registry = config.formats.registry();
        assert_eq!(registry.allowed(), &[SerializationFormat::Compact]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ServerConfig::from_yaml("listne: 1.2.3.4:80").is_err());
    }
}
