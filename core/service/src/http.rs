// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! The HTTP-facing call pipeline.
//!
//! One request flows: method gate → format negotiation → body aggregation →
//! envelope decode → method resolution → argument decode → scoped handler
//! invocation → reply or exception encoding. Everything before and after
//! the invocation is synchronous; aggregation and the handler itself are the
//! only suspension points.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use indexmap::IndexMap;
use thrift::protocol::{TInputProtocol, TMessageType};
use thrift::{ApplicationError, ApplicationErrorKind};
use tracing::{debug, warn};

use tram_protocol::{
    encode_exception, encode_reply, message_type_name, FormatRegistry, MediaType,
    SerializationFormat, ThriftArgs, ThriftResult,
};

use crate::builder::ThriftHttpServiceBuilder;
use crate::context::ServiceRequestContext;
use crate::descriptor::MethodDescriptor;
use crate::dispatch::{split_name, ServiceEntry, ThriftCallService};
use crate::errors::{trace_text, ServiceError};
use crate::rpc::{BoxError, HandlerPanic, RpcError, RpcRequest};
use crate::service::{RpcService, ThriftService};

const PROTOCOL_NOT_SUPPORTED: &str = "Specified content-type not supported";

const ACCEPT_MUST_MATCH_CONTENT_TYPE: &str = "Thrift protocol specified in Accept header must \
                                              match the one specified in the content-type header";

const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Serves Thrift calls carried in HTTP POST bodies.
///
/// Built once at assembly time and shared across workers; all per-request
/// state lives on the stack of [`ThriftHttpService::serve`].
pub struct ThriftHttpService {
    call_service: Arc<ThriftCallService>,
    delegate: Arc<dyn RpcService>,
    formats: FormatRegistry,
    qualified_reply_name: bool,
}

/// Where one request goes after the synchronous decode phase.
enum Decoded {
    /// A response was produced without invoking anything.
    Respond(Response<Bytes>),
    /// A call is ready to dispatch.
    Invoke {
        seq_id: i32,
        reply_name: String,
        descriptor: &'static MethodDescriptor,
        request: RpcRequest,
    },
}

impl ThriftHttpService {
    pub fn builder() -> ThriftHttpServiceBuilder {
        ThriftHttpServiceBuilder::new()
    }

    /// Mounts one implementation at the empty service name with the default
    /// format set (binary first).
    pub fn of(implementation: impl ThriftService) -> Result<Self, ServiceError> {
        Self::builder().add_service(implementation).build()
    }

    /// Like [`ThriftHttpService::of`] with an explicit format set.
    pub fn of_formats(
        implementation: impl ThriftService,
        default_format: SerializationFormat,
        other_formats: impl IntoIterator<Item = SerializationFormat>,
    ) -> Result<Self, ServiceError> {
        Self::builder()
            .add_service(implementation)
            .default_format(default_format)
            .other_formats(other_formats)
            .build()
    }

    pub(crate) fn from_parts(
        call_service: Arc<ThriftCallService>,
        delegate: Arc<dyn RpcService>,
        formats: FormatRegistry,
        qualified_reply_name: bool,
    ) -> Result<Self, ServiceError> {
        // The decorated chain must still expose the dispatch table.
        if delegate.as_call_service().is_none() {
            return Err(ServiceError::NotThriftCallService);
        }
        Ok(Self {
            call_service,
            delegate,
            formats,
            qualified_reply_name,
        })
    }

    /// The services being served, keyed by service name (empty when not
    /// multiplexed).
    pub fn entries(&self) -> &IndexMap<String, ServiceEntry> {
        self.call_service.entries()
    }

    pub fn allowed_formats(&self) -> &[SerializationFormat] {
        self.formats.allowed()
    }

    pub fn default_format(&self) -> SerializationFormat {
        self.formats.default_format()
    }

    /// Processes one HTTP request into a complete response.
    ///
    /// All request-level failures become HTTP or Thrift-framed responses;
    /// `Err` is reserved for response-encoding failures after a parsed
    /// envelope, which the transport glue surfaces as its own failure.
    pub async fn serve<B>(
        &self,
        ctx: Arc<ServiceRequestContext>,
        req: Request<B>,
    ) -> Result<Response<Bytes>, ServiceError>
    where
        B: http_body::Body + Send,
        B::Data: Send,
        B::Error: Into<BoxError>,
    {
        if req.method() != Method::POST {
            return Ok(plain_response(StatusCode::METHOD_NOT_ALLOWED, None));
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let Some(format) = self.formats.negotiate(content_type.as_deref()) else {
            return Ok(plain_response(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Some(PROTOCOL_NOT_SUPPORTED.to_string()),
            ));
        };

        if !validate_accept_headers(&req, format) {
            return Ok(plain_response(
                StatusCode::NOT_ACCEPTABLE,
                Some(ACCEPT_MUST_MATCH_CONTENT_TYPE.to_string()),
            ));
        }

        ctx.log().serialization_format(format);
        ctx.log().defer_request_content();

        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                let cause: BoxError = e.into();
                warn!(error = %cause, "failed to aggregate the request body");
                let body = ctx
                    .verbose_responses()
                    .then(|| trace_text(&*cause));
                return Ok(plain_response(StatusCode::INTERNAL_SERVER_ERROR, body));
            }
        };

        let decoded = self.decode(&ctx, format, body);
        // Close the deferred request content on every path; a recorded call
        // wins over this no-op.
        ctx.log().request_content(None);

        match decoded? {
            Decoded::Respond(res) => Ok(res),
            Decoded::Invoke {
                seq_id,
                reply_name,
                descriptor,
                request,
            } => {
                self.invoke(ctx, format, seq_id, reply_name, descriptor, request)
                    .await
            }
        }
    }

    /// Envelope decode, method resolution, and argument decode.
    ///
    /// Owns the aggregated body for its whole extent: the input buffer is
    /// released exactly once, when this function returns.
    fn decode(
        &self,
        ctx: &ServiceRequestContext,
        format: SerializationFormat,
        body: Bytes,
    ) -> Result<Decoded, ServiceError> {
        let mut i_prot = format.reader(&body);

        let header = match i_prot.read_message_begin() {
            Ok(header) => header,
            Err(e) => {
                debug!(%format, error = %e, "failed to decode a message header");
                let body = if ctx.verbose_responses() {
                    format!("Failed to decode a {} header: {}", format, trace_text(&e))
                } else {
                    format!("Failed to decode a {} header", format)
                };
                return Ok(Decoded::Respond(plain_response(
                    StatusCode::BAD_REQUEST,
                    Some(body),
                )));
            }
        };

        let seq_id = header.sequence_number;
        let (service_name, method_name) = split_name(&header.name);
        let reply_name = if self.qualified_reply_name {
            header.name.clone()
        } else {
            method_name.to_string()
        };

        // Sanity check; a well-behaved client never fails here.
        if header.message_type != TMessageType::Call && header.message_type != TMessageType::OneWay
        {
            let cause = ApplicationError::new(
                ApplicationErrorKind::InvalidMessageType,
                format!(
                    "unexpected TMessageType: {}",
                    message_type_name(header.message_type)
                ),
            );
            return self.pre_decode_exception(ctx, format, seq_id, &reply_name, cause);
        }

        let Some(binding) = self.call_service.resolve(service_name, method_name) else {
            let cause = ApplicationError::new(
                ApplicationErrorKind::UnknownMethod,
                format!("unknown method: {}", header.name),
            );
            return self.pre_decode_exception(ctx, format, seq_id, &reply_name, cause);
        };
        let descriptor = binding.descriptor();

        let mut args = descriptor.fresh_args();
        let read = args
            .read(&mut *i_prot)
            .and_then(|()| i_prot.read_message_end());
        if let Err(e) = read {
            debug!(error = %e, "failed to decode thrift arguments");
            let cause = ApplicationError::new(
                ApplicationErrorKind::ProtocolError,
                format!("failed to decode arguments: {e}"),
            );
            return self.pre_decode_exception(ctx, format, seq_id, &reply_name, cause);
        }

        let request = RpcRequest::new(descriptor.service_kind, header.name.clone(), args);
        ctx.log().request_content(Some(format!("{request:?}")));

        Ok(Decoded::Invoke {
            seq_id,
            reply_name,
            descriptor,
            request,
        })
    }

    /// Invokes through the decorated chain with the context made current.
    ///
    /// The invocation runs as its own task: a response cancelled mid-flight
    /// lets the handler finish while its result is discarded, and a handler
    /// panic surfaces as the task's join error rather than tearing down the
    /// connection.
    async fn invoke(
        &self,
        ctx: Arc<ServiceRequestContext>,
        format: SerializationFormat,
        seq_id: i32,
        reply_name: String,
        descriptor: &'static MethodDescriptor,
        request: RpcRequest,
    ) -> Result<Response<Bytes>, ServiceError> {
        let handle = tokio::spawn({
            let ctx = Arc::clone(&ctx);
            let delegate = Arc::clone(&self.delegate);
            async move {
                let fut = {
                    let ctx = Arc::clone(&ctx);
                    async move { delegate.serve(ctx, request).await }
                };
                ctx.scope(fut).await
            }
        });

        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join) => Err(RpcError::Execution(panic_cause(join))),
        };

        if descriptor.oneway {
            // One-way methods acknowledge with an empty body regardless of
            // the handler outcome; the reply handle logs a null payload.
            ctx.log().response_content(None);
            return Ok(thrift_response(format, Bytes::new()));
        }

        match outcome {
            Ok(result) => self.respond_reply(&ctx, format, seq_id, &reply_name, &*result),
            Err(RpcError::HttpStatus(status)) => Ok(plain_response(status, None)),
            Err(RpcError::HttpResponse(res)) => Ok(res),
            Err(RpcError::Execution(cause)) => {
                if let Some(result) = descriptor.declared_result_for(&*cause) {
                    // A declared exception travels inside a REPLY envelope.
                    return self.respond_reply(&ctx, format, seq_id, &reply_name, &*result);
                }

                warn!(method = %reply_name, error = %cause, "handler threw an undeclared exception");
                let exception = if ctx.verbose_responses() {
                    ApplicationError::new(
                        ApplicationErrorKind::InternalError,
                        format!(
                            "\n---- BEGIN server-side trace ----\n{}---- END server-side trace ----",
                            trace_text(&*cause)
                        ),
                    )
                } else {
                    ApplicationError::new(ApplicationErrorKind::InternalError, "")
                };

                let body = encode_exception(format, &reply_name, seq_id, &exception)
                    .map_err(ServiceError::Encode)?;
                ctx.log().response_content(Some(format!(
                    "EXCEPTION({:?}): {}",
                    exception.kind, exception.message
                )));
                Ok(thrift_response(format, Bytes::from(body)))
            }
        }
    }

    fn respond_reply(
        &self,
        ctx: &ServiceRequestContext,
        format: SerializationFormat,
        seq_id: i32,
        reply_name: &str,
        result: &dyn ThriftResult,
    ) -> Result<Response<Bytes>, ServiceError> {
        let body = encode_reply(format, reply_name, seq_id, result).map_err(ServiceError::Encode)?;
        ctx.log().response_content(Some(format!("{result:?}")));
        Ok(thrift_response(format, Bytes::from(body)))
    }

    /// Encodes an application exception raised before the handler ran.
    fn pre_decode_exception(
        &self,
        ctx: &ServiceRequestContext,
        format: SerializationFormat,
        seq_id: i32,
        reply_name: &str,
        cause: ApplicationError,
    ) -> Result<Decoded, ServiceError> {
        let body =
            encode_exception(format, reply_name, seq_id, &cause).map_err(ServiceError::Encode)?;
        ctx.log()
            .response_content(Some(format!("EXCEPTION({:?}): {}", cause.kind, cause.message)));
        Ok(Decoded::Respond(thrift_response(format, Bytes::from(body))))
    }
}

/// At least one Accept value, when any is present, must be accepted by the
/// chosen format.
fn validate_accept_headers<B>(req: &Request<B>, format: SerializationFormat) -> bool {
    let mut saw_any = false;
    let mut matched = false;
    for value in req.headers().get_all(ACCEPT) {
        let Ok(value) = value.to_str() else {
            saw_any = true;
            continue;
        };
        for range in value.split(',') {
            let range = range.trim();
            if range.is_empty() {
                continue;
            }
            saw_any = true;
            if let Ok(parsed) = range.parse::<MediaType>() {
                if format.is_accepted(&parsed) {
                    matched = true;
                }
            }
        }
    }
    !saw_any || matched
}

fn plain_response(status: StatusCode, body: Option<String>) -> Response<Bytes> {
    let has_body = body.is_some();
    let mut res = Response::new(body.map(Bytes::from).unwrap_or_default());
    *res.status_mut() = status;
    if has_body {
        res.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8));
    }
    res
}

fn thrift_response(format: SerializationFormat, body: Bytes) -> Response<Bytes> {
    let mut res = Response::new(body);
    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static(format.media_type_header()),
    );
    res
}

fn panic_cause(join: tokio::task::JoinError) -> BoxError {
    let message = match join.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "opaque panic payload".to_string()),
        Err(join) => join.to_string(),
    };
    Box::new(HandlerPanic(message))
}
