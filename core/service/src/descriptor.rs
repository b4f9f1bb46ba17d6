// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Static per-method metadata emitted by generated service glue.
//!
//! Descriptors are plain data: factories, the argument field order, the
//! one-way flag, and the declared-exception capture hook. The adapter
//! consumes them without reflection; a code generator (or hand-written
//! glue, as in the test services) produces one table per service interface.

use std::fmt;

use tram_protocol::{ThriftArgs, ThriftResult};

/// One argument field of a method, in the generated struct's metadata order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgField {
    pub id: i16,
    pub name: &'static str,
}

pub struct MethodDescriptor {
    /// Bare method name, without any multiplexing prefix.
    pub name: &'static str,
    /// Tag naming the generated service interface, for observability.
    pub service_kind: &'static str,
    /// One-way methods are acknowledged with an empty body.
    pub oneway: bool,
    /// Argument fields in ascending field-id order; governs the positional
    /// call shape.
    pub arg_fields: &'static [ArgField],
    pub new_args: fn() -> Box<dyn ThriftArgs>,
    pub new_result: fn() -> Box<dyn ThriftResult>,
    /// When `cause` is one of the method's declared exception types, returns
    /// a result struct with the matching exception field populated.
    pub capture_declared:
        fn(&(dyn std::error::Error + Send + Sync + 'static)) -> Option<Box<dyn ThriftResult>>,
}

impl MethodDescriptor {
    pub fn fresh_args(&self) -> Box<dyn ThriftArgs> {
        (self.new_args)()
    }

    pub fn fresh_result(&self) -> Box<dyn ThriftResult> {
        (self.new_result)()
    }

    pub fn declared_result_for(
        &self,
        cause: &(dyn std::error::Error + Send + Sync + 'static),
    ) -> Option<Box<dyn ThriftResult>> {
        (self.capture_declared)(cause)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("service_kind", &self.service_kind)
            .field("oneway", &self.oneway)
            .field("arg_fields", &self.arg_fields)
            .finish()
    }
}

/// `capture_declared` for methods without a `throws` clause.
pub fn no_declared_exceptions(
    _cause: &(dyn std::error::Error + Send + Sync + 'static),
) -> Option<Box<dyn ThriftResult>> {
    None
}
