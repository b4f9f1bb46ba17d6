// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Fluent assembly of a [`ThriftHttpService`].
//!
//! Implementations are collected per service name (the empty name for
//! non-multiplexed mounting), decorators compose left-to-right around the
//! dispatch table, and the allowed-format set is fixed with the default in
//! front.

use std::sync::Arc;

use indexmap::IndexMap;

use tram_protocol::{FormatRegistry, SerializationFormat};

use crate::dispatch::ThriftCallService;
use crate::errors::ServiceError;
use crate::http::ThriftHttpService;
use crate::service::{RpcService, ThriftService};

type DecoratorFn = Box<dyn FnOnce(Arc<dyn RpcService>) -> Arc<dyn RpcService> + Send>;

pub struct ThriftHttpServiceBuilder {
    implementations: IndexMap<String, Vec<Arc<dyn ThriftService>>>,
    default_format: SerializationFormat,
    other_formats: Vec<SerializationFormat>,
    decorators: Vec<DecoratorFn>,
    qualified_reply_name: bool,
}

impl Default for ThriftHttpServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ThriftHttpServiceBuilder {
    pub fn new() -> Self {
        Self {
            implementations: IndexMap::new(),
            default_format: SerializationFormat::Binary,
            other_formats: SerializationFormat::values().to_vec(),
            decorators: Vec::new(),
            qualified_reply_name: true,
        }
    }

    /// Mounts an implementation at the empty (non-multiplexed) service name.
    pub fn add_service(self, implementation: impl ThriftService) -> Self {
        self.add_service_named("", implementation)
    }

    /// Mounts an implementation under a multiplexed service name.
    pub fn add_service_named(
        self,
        name: impl Into<String>,
        implementation: impl ThriftService,
    ) -> Self {
        self.add_shared_service(name, Arc::new(implementation))
    }

    pub fn add_shared_service(
        mut self,
        name: impl Into<String>,
        implementation: Arc<dyn ThriftService>,
    ) -> Self {
        self.implementations
            .entry(name.into())
            .or_default()
            .push(implementation);
        self
    }

    /// The format used when the client does not name one.
    pub fn default_format(mut self, format: SerializationFormat) -> Self {
        self.default_format = format;
        self
    }

    /// Formats supported in addition to the default. Replaces the previous
    /// set, which starts out as every supported format.
    pub fn other_formats(
        mut self,
        formats: impl IntoIterator<Item = SerializationFormat>,
    ) -> Self {
        self.other_formats = formats.into_iter().collect();
        self
    }

    /// Wraps the handler chain with `decorator`. Decorators apply in the
    /// order given: the last one added becomes the outermost.
    pub fn decorate<F>(mut self, decorator: F) -> Self
    where
        F: FnOnce(Arc<dyn RpcService>) -> Arc<dyn RpcService> + Send + 'static,
    {
        self.decorators.push(Box::new(decorator));
        self
    }

    /// Whether reply envelopes echo the full original name (`svc:method`)
    /// or only the method part. Defaults to echoing the full name.
    pub fn qualified_reply_name(mut self, qualified: bool) -> Self {
        self.qualified_reply_name = qualified;
        self
    }

    pub fn build(self) -> Result<ThriftHttpService, ServiceError> {
        let call_service = Arc::new(ThriftCallService::new(self.implementations)?);

        let mut delegate: Arc<dyn RpcService> = Arc::clone(&call_service) as Arc<dyn RpcService>;
        for decorator in self.decorators {
            delegate = decorator(delegate);
        }

        ThriftHttpService::from_parts(
            call_service,
            delegate,
            FormatRegistry::new(self.default_format, self.other_formats),
            self.qualified_reply_name,
        )
    }
}
