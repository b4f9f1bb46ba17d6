// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! What Thrift-compiler output looks like against the adapter's seams, for
//! a one-method service:
//!
//! ```thrift
//! service GreetingService {
//!     string greet(1: string name);
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use thrift::protocol::{
    field_id, TFieldIdentifier, TInputProtocol, TOutputProtocol, TStructIdentifier, TType,
};
use thrift::{ApplicationError, ApplicationErrorKind};

use tram_protocol::{ParamValue, ThriftArgs, ThriftResult};
use tram_service::{
    no_declared_exceptions, ArgField, MethodDescriptor, MethodFuture, RpcError, ThriftService,
};

#[async_trait]
pub trait GreetingIface: Send + Sync + 'static {
    async fn greet(&self, name: String) -> Result<String, RpcError>;
}

#[derive(Debug, Default)]
pub struct GreetArgs {
    pub name: String,
}

impl ThriftArgs for GreetArgs {
    fn read(&mut self, i_prot: &mut dyn TInputProtocol) -> thrift::Result<()> {
        i_prot.read_struct_begin()?;
        loop {
            let field_ident = i_prot.read_field_begin()?;
            if field_ident.field_type == TType::Stop {
                break;
            }
            match field_id(&field_ident)? {
                1 => self.name = i_prot.read_string()?,
                _ => i_prot.skip(field_ident.field_type)?,
            }
            i_prot.read_field_end()?;
        }
        i_prot.read_struct_end()
    }

    fn params(&self) -> Vec<ParamValue> {
        vec![Box::new(self.name.clone())]
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

#[derive(Debug, Default)]
pub struct GreetResult {
    pub success: Option<String>,
}

impl ThriftResult for GreetResult {
    fn write(&self, o_prot: &mut dyn TOutputProtocol) -> thrift::Result<()> {
        o_prot.write_struct_begin(&TStructIdentifier::new("greet_result"))?;
        if let Some(success) = &self.success {
            o_prot.write_field_begin(&TFieldIdentifier::new("success", TType::String, 0))?;
            o_prot.write_string(success)?;
            o_prot.write_field_end()?;
        }
        o_prot.write_field_stop()?;
        o_prot.write_struct_end()
    }
}

fn new_greet_args() -> Box<dyn ThriftArgs> {
    Box::<GreetArgs>::default()
}

fn new_greet_result() -> Box<dyn ThriftResult> {
    Box::<GreetResult>::default()
}

static GREETING_METHODS: &[MethodDescriptor] = &[MethodDescriptor {
    name: "greet",
    service_kind: "GreetingService",
    oneway: false,
    arg_fields: &[ArgField { id: 1, name: "name" }],
    new_args: new_greet_args,
    new_result: new_greet_result,
    capture_declared: no_declared_exceptions,
}];

pub struct GreetingProcessor<H: GreetingIface> {
    handler: Arc<H>,
}

impl<H: GreetingIface> GreetingProcessor<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl<H: GreetingIface> ThriftService for GreetingProcessor<H> {
    fn methods(&self) -> &'static [MethodDescriptor] {
        GREETING_METHODS
    }

    fn call(&self, method: &str, args: Box<dyn ThriftArgs>) -> MethodFuture {
        let handler = Arc::clone(&self.handler);
        match method {
            "greet" => Box::pin(async move {
                let args = args.into_any().downcast::<GreetArgs>().map_err(|_| {
                    RpcError::execution(thrift::Error::Application(ApplicationError::new(
                        ApplicationErrorKind::Unknown,
                        "unexpected argument struct for greet",
                    )))
                })?;
                let success = handler.greet(args.name).await?;
                Ok(Box::new(GreetResult {
                    success: Some(success),
                }) as Box<dyn ThriftResult>)
            }),
            other => {
                let err = RpcError::execution(thrift::Error::Application(ApplicationError::new(
                    ApplicationErrorKind::UnknownMethod,
                    format!("unknown method: {other}"),
                )));
                Box::pin(async move { Err(err) })
            }
        }
    }
}
