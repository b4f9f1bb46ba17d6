// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Test services for the Thrift-over-HTTP adapter.
//!
//! The modules here play the role of Thrift-compiler output: argument and
//! result structs with their wire read/write code, method descriptor
//! tables, and processor types binding a handler trait to the adapter's
//! [`ThriftService`] seam. They are hand-written so the tests control every
//! byte, but they follow the generated shape closely enough to double as a
//! reference for real glue.
//!
//! [`ThriftService`]: tram_service::ThriftService

pub mod calculator;
pub mod client;
pub mod hello;

use thiserror::Error;

use tram_protocol::ThriftArgs;
use tram_service::RpcError;

/// Failures inside the glue itself, not the handler.
#[derive(Debug, Error)]
pub enum GlueError {
    #[error("unexpected argument struct for method {0}")]
    ArgsType(String),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

/// Recovers the typed argument struct the descriptor's factory produced.
pub(crate) fn downcast_args<T: Send + 'static>(
    method: &str,
    args: Box<dyn ThriftArgs>,
) -> Result<T, RpcError> {
    args.into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| RpcError::execution(GlueError::ArgsType(method.to_string())))
}

pub(crate) fn unknown_method(method: &str) -> RpcError {
    RpcError::execution(GlueError::UnknownMethod(method.to_string()))
}
