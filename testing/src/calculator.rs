// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Generated-style glue for a `CalculatorService` with a declared exception:
//!
//! ```thrift
//! exception DivByZero {
//!     1: string message;
//! }
//!
//! service CalculatorService {
//!     i32 add(1: i32 a, 2: i32 b);
//!     i32 div(1: i32 num, 2: i32 den) throws (1: DivByZero dbz);
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use thrift::protocol::{
    field_id, TFieldIdentifier, TInputProtocol, TOutputProtocol, TStructIdentifier, TType,
};

use tram_protocol::{ParamValue, ThriftArgs, ThriftResult};
use tram_service::{
    no_declared_exceptions, ArgField, MethodDescriptor, MethodFuture, RpcError, ThriftService,
};

use crate::{downcast_args, unknown_method};

const SERVICE_KIND: &str = "CalculatorService";

#[async_trait]
pub trait CalculatorIface: Send + Sync + 'static {
    async fn add(&self, a: i32, b: i32) -> Result<i32, RpcError>;
    async fn div(&self, num: i32, den: i32) -> Result<i32, RpcError>;
}

/// The declared exception of `div`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Error)]
#[error("division by zero: {message}")]
pub struct DivByZero {
    pub message: String,
}

impl DivByZero {
    pub fn write_to(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("DivByZero"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("message", TType::String, 1))?;
        o_prot.write_string(&self.message)?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }

    pub fn read_from(i_prot: &mut dyn TInputProtocol) -> thrift::Result<DivByZero> {
        let mut exception = DivByZero::default();
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => exception.message = i_prot.read_string()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(exception)
    }
}

//
// add
//

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddArgs {
    pub a: i32,
    pub b: i32,
}

impl AddArgs {
    pub fn write_to(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("add_args"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("a", TType::I32, 1))?;
        o_prot.write_i32(self.a)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("b", TType::I32, 2))?;
        o_prot.write_i32(self.b)?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

impl ThriftArgs for AddArgs {
    fn read(&mut self, i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => self.a = i_prot.read_i32()?,
                2 => self.b = i_prot.read_i32()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()
    }

    fn params(&self) -> Vec<ParamValue> {
        vec![Box::new(self.a), Box::new(self.b)]
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddResult {
    pub success: Option<i32>,
}

impl AddResult {
    pub fn read_from(i_prot: &mut dyn TInputProtocol) -> thrift::Result<AddResult> {
        let mut result = AddResult::default();
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                0 => result.success = Some(i_prot.read_i32()?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(result)
    }
}

impl ThriftResult for AddResult {
    fn write(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("add_result"))?;
        if let Some(success) = self.success {
            o_prot.write_field_begin(&TFieldIdentifier::new("success", TType::I32, 0))?;
            o_prot.write_i32(success)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

//
// div
//

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DivArgs {
    pub num: i32,
    pub den: i32,
}

impl DivArgs {
    pub fn write_to(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("div_args"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("num", TType::I32, 1))?;
        o_prot.write_i32(self.num)?;
        o_prot.write_field_end()?;
        o_prot.write_field_begin(&TFieldIdentifier::new("den", TType::I32, 2))?;
        o_prot.write_i32(self.den)?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

impl ThriftArgs for DivArgs {
    fn read(&mut self, i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => self.num = i_prot.read_i32()?,
                2 => self.den = i_prot.read_i32()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()
    }

    fn params(&self) -> Vec<ParamValue> {
        vec![Box::new(self.num), Box::new(self.den)]
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DivResult {
    pub success: Option<i32>,
    pub dbz: Option<DivByZero>,
}

impl DivResult {
    pub fn read_from(i_prot: &mut dyn TInputProtocol) -> thrift::Result<DivResult> {
        let mut result = DivResult::default();
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                0 => result.success = Some(i_prot.read_i32()?),
                1 => result.dbz = Some(DivByZero::read_from(i_prot)?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(result)
    }
}

impl ThriftResult for DivResult {
    fn write(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("div_result"))?;
        if let Some(success) = self.success {
            o_prot.write_field_begin(&TFieldIdentifier::new("success", TType::I32, 0))?;
            o_prot.write_i32(success)?;
            o_prot.write_field_end()?;
        }
        if let Some(dbz) = &self.dbz {
            o_prot.write_field_begin(&TFieldIdentifier::new("dbz", TType::Struct, 1))?;
            dbz.write_to(o_prot)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

//
// descriptor table
//

fn new_add_args() -> Box<dyn ThriftArgs> {
    Box::<AddArgs>::default()
}

fn new_add_result() -> Box<dyn ThriftResult> {
    Box::<AddResult>::default()
}

fn new_div_args() -> Box<dyn ThriftArgs> {
    Box::<DivArgs>::default()
}

fn new_div_result() -> Box<dyn ThriftResult> {
    Box::<DivResult>::default()
}

/// `div` declares `DivByZero`; a matching cause moves into the result's
/// exception field and travels inside the REPLY envelope.
fn capture_div_declared(
    cause: &(dyn std::error::Error + Send + Sync + 'static),
) -> Option<Box<dyn ThriftResult>> {
    cause.downcast_ref::<DivByZero>().map(|dbz| {
        Box::new(DivResult {
            success: None,
            dbz: Some(dbz.clone()),
        }) as Box<dyn ThriftResult>
    })
}

pub static CALCULATOR_METHODS: &[MethodDescriptor] = &[
    MethodDescriptor {
        name: "add",
        service_kind: SERVICE_KIND,
        oneway: false,
        arg_fields: &[ArgField { id: 1, name: "a" }, ArgField { id: 2, name: "b" }],
        new_args: new_add_args,
        new_result: new_add_result,
        capture_declared: no_declared_exceptions,
    },
    MethodDescriptor {
        name: "div",
        service_kind: SERVICE_KIND,
        oneway: false,
        arg_fields: &[
            ArgField { id: 1, name: "num" },
            ArgField { id: 2, name: "den" },
        ],
        new_args: new_div_args,
        new_result: new_div_result,
        capture_declared: capture_div_declared,
    },
];

/// Binds a [`CalculatorIface`] handler to the adapter.
pub struct CalculatorProcessor<H: CalculatorIface> {
    handler: Arc<H>,
}

impl<H: CalculatorIface> CalculatorProcessor<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl<H: CalculatorIface> ThriftService for CalculatorProcessor<H> {
    fn methods(&self) -> &'static [MethodDescriptor] {
        CALCULATOR_METHODS
    }

    fn call(&self, method: &str, args: Box<dyn ThriftArgs>) -> MethodFuture {
        let handler = Arc::clone(&self.handler);
        match method {
            "add" => Box::pin(async move {
                let args = downcast_args::<AddArgs>("add", args)?;
                let success = handler.add(args.a, args.b).await?;
                Ok(Box::new(AddResult {
                    success: Some(success),
                }) as Box<dyn ThriftResult>)
            }),
            "div" => Box::pin(async move {
                let args = downcast_args::<DivArgs>("div", args)?;
                let success = handler.div(args.num, args.den).await?;
                Ok(Box::new(DivResult {
                    success: Some(success),
                    dbz: None,
                }) as Box<dyn ThriftResult>)
            }),
            other => {
                let err = unknown_method(other);
                Box::pin(async move { Err(err) })
            }
        }
    }
}
