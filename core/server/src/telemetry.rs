// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Tracing-subscriber setup, driven by the `tracing:` config section.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfiguration {
    /// An `EnvFilter` directive set, e.g. `info` or `tram_service=debug`.
    #[serde(default = "default_log_level")]
    log_level: String,

    #[serde(default = "default_display_thread_names")]
    display_thread_names: bool,

    #[serde(default)]
    display_thread_ids: bool,
}

impl Default for TracingConfiguration {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            display_thread_names: default_display_thread_names(),
            display_thread_ids: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_display_thread_names() -> bool {
    true
}

impl TracingConfiguration {
    pub fn with_log_level(self, log_level: impl Into<String>) -> Self {
        Self {
            log_level: log_level.into(),
            ..self
        }
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Installs a global stdout subscriber. Call once, from the binary.
    pub fn setup_tracing_subscriber(&self) {
        let filter = EnvFilter::try_new(&self.log_level)
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(self.display_thread_names)
            .with_thread_ids(self.display_thread_ids)
            .init()
    }
}
