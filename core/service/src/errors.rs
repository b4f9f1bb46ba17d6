// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    // Assembly
    #[error("duplicate method {method:?} for service {service:?}")]
    DuplicateMethod { service: String, method: String },
    #[error("no service implementations registered")]
    NoImplementations,
    #[error("service being decorated is not a ThriftCallService")]
    NotThriftCallService,

    // Response encoding after a parsed envelope; unrecoverable for the
    // request, surfaced to the transport glue.
    #[error("failed to encode a Thrift response")]
    Encode(#[source] thrift::Error),
}

/// Renders an error and its source chain, one frame per line.
///
/// This is the only representation of a server-side failure that may reach
/// the wire, and only when verbose responses are enabled.
pub fn trace_text(cause: &(dyn std::error::Error + 'static)) -> String {
    let mut text = format!("{cause}\n");
    let mut source = cause.source();
    while let Some(next) = source {
        text.push_str(&format!("Caused by: {next}\n"));
        source = next.source();
    }
    text
}
