// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! A runnable greeting service:
//!
//! ```text
//! cargo run --bin echo-server -- --listen 127.0.0.1:8080
//! curl -X POST -H 'Content-Type: application/x-thrift' \
//!      --data-binary @greet-call.bin http://127.0.0.1:8080/
//! ```

mod args;
mod glue;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tram_server::{runner, ServerConfig};
use tram_service::{RpcError, ThriftHttpService};

use crate::glue::{GreetingIface, GreetingProcessor};

struct Greeter;

#[async_trait::async_trait]
impl GreetingIface for Greeter {
    async fn greet(&self, name: String) -> Result<String, RpcError> {
        Ok(format!("Hello, {name}!"))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = args::Args::parse();

    let mut config = match args.config() {
        Some(path) => ServerConfig::from_file(path).context("failed to load configuration")?,
        None => ServerConfig::default(),
    };
    if let Some(listen) = args.listen() {
        config.listen = listen.to_string();
    }

    config.tracing.setup_tracing_subscriber();
    info!(listen = %config.listen, "starting greeting service");

    let service = ThriftHttpService::builder()
        .add_service(GreetingProcessor::new(Greeter))
        .default_format(config.formats.default)
        .other_formats(config.formats.others.iter().copied())
        .build()
        .context("failed to assemble the thrift service")?;

    runner::serve(&config, Arc::new(service))
        .await
        .context("server terminated abnormally")?;
    Ok(())
}
