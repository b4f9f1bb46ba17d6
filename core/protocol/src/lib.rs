// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Wire-format plumbing for serving Thrift calls over HTTP.
//!
//! This crate owns the pieces of the adapter that talk about bytes rather
//! than about services:
//! - [`SerializationFormat`]: the supported Thrift encodings, each paired
//!   with its media types and a protocol factory binding a byte buffer to a
//!   reader or writer.
//! - [`FormatRegistry`]: the ordered set of formats allowed by one endpoint,
//!   with Content-Type negotiation and the permissive fallback for vague
//!   media types.
//! - [`ThriftArgs`] / [`ThriftResult`]: object-safe views of generated
//!   argument and result structs, consumed by the dispatch layer without any
//!   runtime reflection.
//! - envelope helpers that frame a reply or an application exception the way
//!   `[writeMessageBegin, struct, writeMessageEnd]` does on the wire.

pub mod envelope;
pub mod errors;
pub mod format;
pub mod media_type;
pub mod message;

pub use envelope::{encode_exception, encode_reply, message_type_name};
pub use errors::CodecError;
pub use format::{FormatRegistry, SerializationFormat};
pub use media_type::MediaType;
pub use message::{ParamValue, ThriftArgs, ThriftResult};
