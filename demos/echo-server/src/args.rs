// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "echo-server", about = "Serves a Thrift GreetingService over HTTP")]
pub struct Args {
    /// Path to a YAML server configuration file.
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address, overriding the configuration.
    #[arg(short, long)]
    listen: Option<String>,
}

impl Args {
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn listen(&self) -> Option<&str> {
        self.listen.as_deref()
    }
}
