// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! The two service seams of the adapter.
//!
//! [`ThriftService`] is what generated glue implements once per service
//! interface: a static method table plus a typed invocation entry point.
//! [`RpcService`] is the decoration seam: user middleware wraps an
//! `Arc<dyn RpcService>` and the innermost link is always the dispatch
//! table, reachable through [`RpcService::as_call_service`].

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use tram_protocol::{ThriftArgs, ThriftResult};

use crate::context::ServiceRequestContext;
use crate::descriptor::MethodDescriptor;
use crate::dispatch::ThriftCallService;
use crate::rpc::{RpcError, RpcRequest};

pub type MethodFuture = BoxFuture<'static, Result<Box<dyn ThriftResult>, RpcError>>;

/// One mounted Thrift service implementation plus its generated metadata.
pub trait ThriftService: Send + Sync + 'static {
    /// The static method table emitted by the generated glue.
    fn methods(&self) -> &'static [MethodDescriptor];

    /// Invokes `method` with its decoded arguments.
    ///
    /// The current [`ServiceRequestContext`] is available task-locally for
    /// the whole call. The returned future may complete on any worker.
    fn call(&self, method: &str, args: Box<dyn ThriftArgs>) -> MethodFuture;
}

/// An RPC-level service, decoratable by user middleware.
#[async_trait]
pub trait RpcService: Send + Sync + 'static {
    async fn serve(
        &self,
        ctx: Arc<ServiceRequestContext>,
        req: RpcRequest,
    ) -> Result<Box<dyn ThriftResult>, RpcError>;

    /// The innermost dispatch table, when this service (directly or through
    /// its delegates) wraps one. Decorators must forward this.
    fn as_call_service(&self) -> Option<&ThriftCallService> {
        None
    }
}
