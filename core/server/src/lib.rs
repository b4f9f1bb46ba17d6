// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Transport glue for [`tram_service::ThriftHttpService`]: a plain HTTP/1
//! serve loop, YAML configuration, tracing setup, and graceful shutdown on
//! SIGINT/SIGTERM.

pub mod config;
pub mod errors;
pub mod runner;
pub mod signal;
pub mod telemetry;

pub use config::{FormatsConfig, ServerConfig};
pub use errors::ServerError;
pub use runner::serve;
pub use telemetry::TracingConfiguration;
