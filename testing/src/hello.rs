// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Generated-style glue for a small `HelloService`:
//!
//! ```thrift
//! service HelloService {
//!     string echo(1: string msg);
//!     i32 serial();
//!     oneway void ping();
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use thrift::protocol::{
    field_id, TFieldIdentifier, TInputProtocol, TOutputProtocol, TStructIdentifier, TType,
};

use tram_protocol::{ParamValue, ThriftArgs, ThriftResult};
use tram_service::{
    no_declared_exceptions, ArgField, MethodDescriptor, MethodFuture, RpcError, ThriftService,
};

use crate::{downcast_args, unknown_method};

const SERVICE_KIND: &str = "HelloService";

#[async_trait]
pub trait HelloIface: Send + Sync + 'static {
    async fn echo(&self, msg: String) -> Result<String, RpcError>;
    async fn serial(&self) -> Result<i32, RpcError>;
    async fn ping(&self) -> Result<(), RpcError>;
}

//
// echo
//

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EchoArgs {
    pub msg: String,
}

impl EchoArgs {
    /// Client-side encoding, used by tests to build request bodies.
    pub fn write_to(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("echo_args"))?;
        o_prot.write_field_begin(&TFieldIdentifier::new("msg", TType::String, 1))?;
        o_prot.write_string(&self.msg)?;
        o_prot.write_field_end()?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

impl ThriftArgs for EchoArgs {
    fn read(&mut self, i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => self.msg = i_prot.read_string()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()
    }

    fn params(&self) -> Vec<ParamValue> {
        vec![Box::new(self.msg.clone())]
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EchoResult {
    pub success: Option<String>,
}

impl EchoResult {
    /// Client-side decoding, used by tests to check response bodies.
    pub fn read_from(i_prot: &mut dyn TInputProtocol) -> thrift::Result<EchoResult> {
        let mut result = EchoResult::default();
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                0 => result.success = Some(i_prot.read_string()?),
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()?;
        Ok(result)
    }
}

impl ThriftResult for EchoResult {
    fn write(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("echo_result"))?;
        if let Some(success) = &self.success {
            o_prot.write_field_begin(&TFieldIdentifier::new("success", TType::String, 0))?;
            o_prot.write_string(success)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

//
// serial
//

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SerialArgs;

impl SerialArgs {
    pub fn write_to(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("serial_args"))?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

impl ThriftArgs for SerialArgs {
    fn read(&mut self, i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            i_prot.skip(field_ident.field_type)?;
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()
    }

    fn params(&self) -> Vec<ParamValue> {
        Vec::new()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SerialResult {
    pub success: Option<i32>,
}

impl SerialResult {
    pub fn read_from(i_prot: &mut dyn TInputProtocol) -> thrift::Result<SerialResult> {
        let mut result = SerialResult::default();
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

impl ThriftResult for SerialResult {
    fn write(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("serial_result"))?;
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
// ping (oneway)
//

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PingArgs;

impl PingArgs {
    pub fn write_to(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("ping_args"))?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

impl ThriftArgs for PingArgs {
    fn read(&mut self, i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            i_prot.skip(field_ident.field_type)?;
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()
    }

    fn params(&self) -> Vec<ParamValue> {
        Vec::new()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Never sent; one-way calls are acknowledged with an empty body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PingResult;

impl ThriftResult for PingResult {
    fn write(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("ping_result"))?;
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

//
// descriptor table
//

fn new_echo_args() -> Box<dyn ThriftArgs> {
    Box::<EchoArgs>::default()
}

fn new_echo_result() -> Box<dyn ThriftResult> {
    Box::<EchoResult>::default()
}

fn new_serial_args() -> Box<dyn ThriftArgs> {
    Box::<SerialArgs>::default()
}

fn new_serial_result() -> Box<dyn ThriftResult> {
    Box::<SerialResult>::default()
}

fn new_ping_args() -> Box<dyn ThriftArgs> {
    Box::<PingArgs>::default()
}

fn new_ping_result() -> Box<dyn ThriftResult> {
    Box::<PingResult>::default()
}

pub static HELLO_METHODS: &[MethodDescriptor] = &[
    MethodDescriptor {
        name: "echo",
        service_kind: SERVICE_KIND,
        oneway: false,
        arg_fields: &[ArgField { id: 1, name: "msg" }],
        new_args: new_echo_args,
        new_result: new_echo_result,
        capture_declared: no_declared_exceptions,
    },
    MethodDescriptor {
        name: "serial",
        service_kind: SERVICE_KIND,
        oneway: false,
        arg_fields: &[],
        new_args: new_serial_args,
        new_result: new_serial_result,
        capture_declared: no_declared_exceptions,
    },
    MethodDescriptor {
        name: "ping",
        service_kind: SERVICE_KIND,
        oneway: true,
        arg_fields: &[],
        new_args: new_ping_args,
        new_result: new_ping_result,
        capture_declared: no_declared_exceptions,
    },
];

/// Binds a [`HelloIface`] handler to the adapter.
pub struct HelloProcessor<H: HelloIface> {
    handler: Arc<H>,
}

impl<H: HelloIface> HelloProcessor<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl<H: HelloIface> ThriftService for HelloProcessor<H> {
    fn methods(&self) -> &'static [MethodDescriptor] {
        HELLO_METHODS
    }

    fn call(&self, method: &str, args: Box<dyn ThriftArgs>) -> MethodFuture {
        let handler = Arc::clone(&self.handler);
        match method {
            "echo" => Box::pin(async move {
                let args = downcast_args::<EchoArgs>("echo", args)?;
                let success = handler.echo(args.msg).await?;
                Ok(Box::new(EchoResult {
                    success: Some(success),
                }) as Box<dyn ThriftResult>)
            }),
            "serial" => Box::pin(async move {
                let _ = downcast_args::<SerialArgs>("serial", args)?;
                let success = handler.serial().await?;
                Ok(Box::new(SerialResult {
                    success: Some(success),
                }) as Box<dyn ThriftResult>)
            }),
            "ping" => Box::pin(async move {
                let _ = downcast_args::<PingArgs>("ping", args)?;
                handler.ping().await?;
                Ok(Box::new(PingResult) as Box<dyn ThriftResult>)
            }),
            other => {
                let err = unknown_method(other);
                Box::pin(async move { Err(err) })
            }
        }
    }
}
