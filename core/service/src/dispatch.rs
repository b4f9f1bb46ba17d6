// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! The multiplex dispatch table.
//!
//! Maps a service name (the empty string for non-multiplexed mounting) to
//! the implementations registered under it, flattened at construction into
//! one method namespace per name. A method resolves to exactly one
//! implementation or the table refuses to build.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use thrift::{ApplicationError, ApplicationErrorKind};

use crate::context::ServiceRequestContext;
use crate::descriptor::MethodDescriptor;
use crate::errors::ServiceError;
use crate::rpc::{RpcError, RpcRequest};
use crate::service::{RpcService, ThriftService};

use tram_protocol::ThriftResult;

/// Splits an envelope name on the first `:`.
///
/// The prefix is the service name and the suffix the method name; with no
/// colon the service name is empty. Later colons belong to the method.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((service, method)) => (service, method),
        None => ("", name),
    }
}

/// The resolution of one (service, method) pair.
pub struct MethodBinding {
    descriptor: &'static MethodDescriptor,
    implementation: Arc<dyn ThriftService>,
}

impl MethodBinding {
    pub fn descriptor(&self) -> &'static MethodDescriptor {
        self.descriptor
    }

    pub fn implementation(&self) -> &Arc<dyn ThriftService> {
        &self.implementation
    }
}

/// Everything mounted under one service name.
pub struct ServiceEntry {
    name: String,
    methods: IndexMap<&'static str, MethodBinding>,
}

impl ServiceEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &IndexMap<&'static str, MethodBinding> {
        &self.methods
    }
}

/// Service name → merged method namespace. Immutable once built.
pub struct ThriftCallService {
    entries: IndexMap<String, ServiceEntry>,
}

impl ThriftCallService {
    /// Mounts a single implementation at the empty (non-multiplexed) name.
    pub fn of(implementation: Arc<dyn ThriftService>) -> Result<Self, ServiceError> {
        let mut implementations: IndexMap<String, Vec<Arc<dyn ThriftService>>> = IndexMap::new();
        implementations.insert(String::new(), vec![implementation]);
        Self::new(implementations)
    }

    pub fn new(
        implementations: IndexMap<String, Vec<Arc<dyn ThriftService>>>,
    ) -> Result<Self, ServiceError> {
        if implementations.values().all(|list| list.is_empty()) {
            return Err(ServiceError::NoImplementations);
        }

        let mut entries = IndexMap::new();
        for (name, list) in implementations {
            let mut methods: IndexMap<&'static str, MethodBinding> = IndexMap::new();
            for implementation in list {
                for descriptor in implementation.methods() {
                    if methods.contains_key(descriptor.name) {
                        return Err(ServiceError::DuplicateMethod {
                            service: name,
                            method: descriptor.name.to_string(),
                        });
                    }
                    methods.insert(
                        descriptor.name,
                        MethodBinding {
                            descriptor,
                            implementation: Arc::clone(&implementation),
                        },
                    );
                }
            }
            entries.insert(name.clone(), ServiceEntry { name, methods });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &IndexMap<String, ServiceEntry> {
        &self.entries
    }

    pub fn resolve(&self, service: &str, method: &str) -> Option<&MethodBinding> {
        self.entries.get(service)?.methods.get(method)
    }
}

#[async_trait]
impl RpcService for ThriftCallService {
    async fn serve(
        &self,
        _ctx: Arc<ServiceRequestContext>,
        req: RpcRequest,
    ) -> Result<Box<dyn ThriftResult>, RpcError> {
        let (service_name, method_name) = split_name(req.method());
        let Some(binding) = self.resolve(service_name, method_name) else {
            return Err(RpcError::execution(thrift::Error::Application(
                ApplicationError::new(
                    ApplicationErrorKind::UnknownMethod,
                    format!("unknown method: {}", req.method()),
                ),
            )));
        };
        let method = method_name.to_string();
        binding.implementation.call(&method, req.into_args()).await
    }

    fn as_call_service(&self) -> Option<&ThriftCallService> {
        Some(self)
    }
}
