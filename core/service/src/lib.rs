// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! # tram-service — Thrift services over HTTP
//!
//! The server-side adapter that exposes Thrift-generated services over
//! HTTP: a POST body carries one Thrift-encoded call, the adapter decodes
//! it, dispatches to the registered implementation, and writes the encoded
//! reply (or Thrift application exception) back as the response body.
//!
//! ## Assembly
//!
//! ```rust,ignore
//! let service = ThriftHttpService::builder()
//!     .add_service(HelloProcessor::new(HelloHandler))          // echo()
//!     .add_service_named("calc", CalculatorProcessor::new(c))  // multiplexed
//!     .decorate(|inner| Arc::new(MyAuthDecorator { inner }))
//!     .build()?;
//! ```
//!
//! ## Shape of one request
//!
//! The pipeline negotiates a [`SerializationFormat`] from the Content-Type
//! header, aggregates the body, reads the call envelope, resolves
//! `(service, method)` through the dispatch table, decodes the argument
//! struct, and invokes the handler with the [`ServiceRequestContext`] made
//! current. Declared exceptions travel inside `REPLY` envelopes; everything
//! else becomes a Thrift application exception or a plain HTTP error, as
//! listed in the crate's error table.
//!
//! [`SerializationFormat`]: tram_protocol::SerializationFormat

pub mod builder;
pub mod context;
pub mod descriptor;
pub mod dispatch;
pub mod errors;
pub mod http;
pub mod rpc;
pub mod service;

pub use builder::ThriftHttpServiceBuilder;
pub use context::{RequestLog, RequestLogBuilder, ServiceRequestContext};
pub use descriptor::{no_declared_exceptions, ArgField, MethodDescriptor};
pub use dispatch::{split_name, MethodBinding, ServiceEntry, ThriftCallService};
pub use errors::{trace_text, ServiceError};
pub use http::ThriftHttpService;
pub use rpc::{BoxError, HandlerPanic, RpcError, RpcParams, RpcRequest};
pub use service::{MethodFuture, RpcService, ThriftService};
