// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! The positional call representation handed to the decorated handler chain.

use std::fmt;

use bytes::Bytes;
use http::{Response, StatusCode};
use thiserror::Error;

use tram_protocol::{ParamValue, ThriftArgs};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One decoded Thrift call: the owning service kind tag, the full envelope
/// name as received, and the decoded argument struct.
pub struct RpcRequest {
    service_kind: &'static str,
    method: String,
    args: Box<dyn ThriftArgs>,
}

impl RpcRequest {
    pub fn new(service_kind: &'static str, method: impl Into<String>, args: Box<dyn ThriftArgs>) -> Self {
        Self {
            service_kind,
            method: method.into(),
            args,
        }
    }

    pub fn service_kind(&self) -> &'static str {
        self.service_kind
    }

    /// The full envelope name, `service:method` or plain `method`.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &dyn ThriftArgs {
        &*self.args
    }

    pub fn into_args(self) -> Box<dyn ThriftArgs> {
        self.args
    }

    /// Lifts the decoded arguments into their positional shape.
    pub fn params(&self) -> RpcParams {
        let mut values = self.args.params();
        match values.len() {
            0 => RpcParams::None,
            1 => RpcParams::Single(values.remove(0)),
            _ => RpcParams::List(values),
        }
    }
}

impl fmt::Debug for RpcRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{:?}", self.service_kind, self.method, self.params())
    }
}

/// Argument values in ascending field-id order.
pub enum RpcParams {
    /// Zero-argument method; the call has no operands.
    None,
    /// Single-argument method; the value stands alone.
    Single(ParamValue),
    /// Two or more arguments, in field-id order.
    List(Vec<ParamValue>),
}

impl fmt::Debug for RpcParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcParams::None => f.write_str("()"),
            RpcParams::Single(value) => write!(f, "({value:?})"),
            RpcParams::List(values) => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value:?}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Why a handler invocation did not produce a result struct.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Escape hatch: respond with this bare HTTP status, no Thrift framing.
    #[error("handler requested HTTP status {0}")]
    HttpStatus(StatusCode),

    /// Escape hatch: emit this HTTP response as-is.
    #[error("handler supplied a complete HTTP response")]
    HttpResponse(Response<Bytes>),

    /// Anything else. Checked against the method's declared exception types
    /// before falling back to a generic Thrift application exception.
    #[error("handler failed")]
    Execution(#[source] BoxError),
}

impl RpcError {
    pub fn execution(cause: impl Into<BoxError>) -> Self {
        RpcError::Execution(cause.into())
    }
}

/// A panic escaping a handler, captured and folded into the
/// undeclared-exception path.
#[derive(Debug, Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanic(pub String);

#[cfg(test)]
mod tests {
    use std::any::Any;

    use thrift::protocol::TInputProtocol;

    use super::*;

    #[derive(Debug, Default)]
    struct PairArgs {
        a: i32,
        b: i32,
    }

    impl ThriftArgs for PairArgs {
        fn read(&mut self, _i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
            Ok(())
        }

        fn params(&self) -> Vec<ParamValue> {
            vec![Box::new(self.a), Box::new(self.b)]
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
            self
        }
    }

    #[derive(Debug, Default)]
    struct EmptyArgs;

    impl ThriftArgs for EmptyArgs {
        fn read(&mut self, _i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
            Ok(())
        }

        fn params(&self) -> Vec<ParamValue> {
            Vec::new()
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
            self
        }
    }

    #[test]
    fn zero_arguments_have_no_operands() {
        let req = RpcRequest::new("PairService", "zero", Box::new(EmptyArgs));
        assert!(matches!(req.params(), RpcParams::None));
        assert_eq!(format!("{req:?}"), "PairService.zero()");
    }

    #[test]
    fn two_arguments_keep_field_order() {
        let req = RpcRequest::new(
            "PairService",
            "add",
            Box::new(PairArgs { a: 2, b: 3 }),
        );
        match req.params() {
            RpcParams::List(values) => {
                assert_eq!(format!("{:?}", values[0]), "2");
                assert_eq!(format!("{:?}", values[1]), "3");
            }
            other => panic!("expected a list, got {other:?}"),
        }
    }

    #[test]
    fn full_envelope_name_is_preserved() {
        let req = RpcRequest::new("PairService", "pair:add", Box::new(EmptyArgs));
        assert_eq!(req.method(), "pair:add");
    }
}
