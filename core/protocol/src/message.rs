// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Object-safe views of generated Thrift structs.
//!
//! The dispatch layer never sees concrete generated types; it works against
//! these traits, which the generated glue implements once per method. That
//! keeps reflection out of the hot path: everything the adapter needs is
//! plain data and function calls.

use std::any::Any;
use std::fmt;

use thrift::protocol::{TInputProtocol, TOutputProtocol};

/// A single positional argument value, rendered for the request log.
pub type ParamValue = Box<dyn fmt::Debug + Send + Sync>;

/// A freshly allocated, still-empty argument struct for one method call.
pub trait ThriftArgs: fmt::Debug + Send + 'static {
    /// Populates the struct from the wire.
    fn read(&mut self, i_prot: &mut dyn TInputProtocol) -> thrift::Result<()>;

    /// The decoded argument values in ascending field-id order.
    fn params(&self) -> Vec<ParamValue>;

    /// Hands the struct back to the glue for a typed downcast.
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

/// A result struct carrying either the success value or a declared exception.
pub trait ThriftResult: fmt::Debug + Send + 'static {
    fn write(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()>;
}
