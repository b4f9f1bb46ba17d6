// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! Per-request context and the request log it carries.
//!
//! The context is made current for the duration of the handler call through
//! [`ServiceRequestContext::scope`], a task-local scope that releases on
//! every exit path. Downstream code (decorators, handler bodies) reaches it
//! with [`ServiceRequestContext::current`].

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use tram_protocol::SerializationFormat;

tokio::task_local! {
    static CURRENT: Arc<ServiceRequestContext>;
}

pub struct ServiceRequestContext {
    verbose_responses: bool,
    log: RequestLogBuilder,
}

impl ServiceRequestContext {
    pub fn new(verbose_responses: bool) -> Self {
        Self {
            verbose_responses,
            log: RequestLogBuilder::default(),
        }
    }

    /// Whether error bodies may carry server-side traces.
    pub fn verbose_responses(&self) -> bool {
        self.verbose_responses
    }

    pub fn log(&self) -> &RequestLogBuilder {
        &self.log
    }

    /// Runs `fut` with this context installed as the current one.
    pub fn scope<F>(self: &Arc<Self>, fut: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        CURRENT.scope(Arc::clone(self), fut)
    }

    /// The context of the call currently being served, if any.
    pub fn current() -> Option<Arc<ServiceRequestContext>> {
        CURRENT.try_with(Arc::clone).ok()
    }
}

impl std::fmt::Debug for ServiceRequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRequestContext")
            .field("verbose_responses", &self.verbose_responses)
            .field("log", &self.log.snapshot())
            .finish()
    }
}

/// What the adapter observed about one request, recorded as it happens.
///
/// Request and response content record at most once; later calls are
/// ignored, so the unconditional "close the deferral" call on the error
/// paths never clobbers a recorded value.
#[derive(Debug, Default)]
pub struct RequestLogBuilder {
    inner: Mutex<RequestLog>,
}

#[derive(Debug, Default, Clone)]
pub struct RequestLog {
    pub serialization_format: Option<SerializationFormat>,
    pub request_content_deferred: bool,
    pub request_content_recorded: bool,
    pub request_content: Option<String>,
    pub response_content_recorded: bool,
    pub response_content: Option<String>,
}

impl RequestLogBuilder {
    pub fn serialization_format(&self, format: SerializationFormat) {
        debug!(%format, "negotiated serialization format");
        self.inner.lock().serialization_format = Some(format);
    }

    /// Marks the request content as arriving later than the headers.
    pub fn defer_request_content(&self) {
        self.inner.lock().request_content_deferred = true;
    }

    /// Records the decoded call, or `None` when decoding never completed.
    pub fn request_content(&self, content: Option<String>) {
        let mut inner = self.inner.lock();
        if inner.request_content_recorded {
            return;
        }
        if let Some(content) = &content {
            debug!(request = %content, "decoded thrift call");
        }
        inner.request_content = content;
        inner.request_content_recorded = true;
        inner.request_content_deferred = false;
    }

    /// Records the encoded reply, or `None` for a one-way acknowledgement.
    pub fn response_content(&self, content: Option<String>) {
        let mut inner = self.inner.lock();
        if inner.response_content_recorded {
            return;
        }
        if let Some(content) = &content {
            debug!(response = %content, "encoded thrift reply");
        }
        inner.response_content = content;
        inner.response_content_recorded = true;
    }

    pub fn snapshot(&self) -> RequestLog {
        self.inner.lock().clone()
    }
}
