// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests for the Thrift-over-HTTP pipeline: negotiation, the
//! envelope/argument decode path, dispatch, declared and undeclared
//! exceptions, and the decorator seam.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Method, Request, StatusCode};
use http_body_util::Full;
use thrift::protocol::TMessageType;
use thrift::ApplicationErrorKind;

use tram_protocol::SerializationFormat;
use tram_service::{
    RpcError, RpcRequest, RpcService, ServiceRequestContext, ThriftCallService, ThriftHttpService,
};
use tram_testing::calculator::{
    AddArgs, AddResult, CalculatorIface, CalculatorProcessor, DivArgs, DivByZero, DivResult,
};
use tram_testing::client::{decode_application_error, decode_message, encode_call, encode_message};
use tram_testing::hello::{
    EchoArgs, EchoResult, HelloIface, HelloProcessor, PingArgs, SerialArgs, SerialResult,
};

const BINARY: SerializationFormat = SerializationFormat::Binary;
const COMPACT: SerializationFormat = SerializationFormat::Compact;

//
// Handlers
//

enum EchoMode {
    Plain,
    Tagged(&'static str),
    Panic,
    HttpStatus,
    Undeclared,
    CtxProbe,
}

struct TestHello {
    mode: EchoMode,
}

impl TestHello {
    fn plain() -> Self {
        Self {
            mode: EchoMode::Plain,
        }
    }

    fn with(mode: EchoMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl HelloIface for TestHello {
    async fn echo(&self, msg: String) -> Result<String, RpcError> {
        match self.mode {
            EchoMode::Plain => Ok(msg),
            EchoMode::Tagged(tag) => Ok(format!("{tag}:{msg}")),
            EchoMode::Panic => panic!("echo exploded"),
            EchoMode::HttpStatus => Err(RpcError::HttpStatus(StatusCode::FORBIDDEN)),
            EchoMode::Undeclared => Err(RpcError::execution(std::io::Error::other("disk on fire"))),
            EchoMode::CtxProbe => Ok(format!(
                "ctx={}",
                ServiceRequestContext::current().is_some()
            )),
        }
    }

    async fn serial(&self) -> Result<i32, RpcError> {
        Ok(47)
    }

    async fn ping(&self) -> Result<(), RpcError> {
        Ok(())
    }
}

struct Arithmetic;

#[async_trait]
impl CalculatorIface for Arithmetic {
    async fn add(&self, a: i32, b: i32) -> Result<i32, RpcError> {
        Ok(a + b)
    }

    async fn div(&self, num: i32, den: i32) -> Result<i32, RpcError> {
        if den == 0 {
            return Err(RpcError::execution(DivByZero {
                message: format!("{num}/0"),
            }));
        }
        Ok(num / den)
    }
}

//
// Request plumbing
//

fn hello_service() -> ThriftHttpService {
    ThriftHttpService::of(HelloProcessor::new(TestHello::plain())).unwrap()
}

fn hello_service_with(mode: EchoMode) -> ThriftHttpService {
    ThriftHttpService::of(HelloProcessor::new(TestHello::with(mode))).unwrap()
}

fn ctx() -> Arc<ServiceRequestContext> {
    Arc::new(ServiceRequestContext::new(false))
}

fn verbose_ctx() -> Arc<ServiceRequestContext> {
    Arc::new(ServiceRequestContext::new(true))
}

fn request(
    method: Method,
    content_type: Option<&str>,
    accept: Option<&str>,
    body: Vec<u8>,
) -> Request<Full<Bytes>> {
    let mut builder = Request::builder().method(method).uri("/thrift");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(Full::new(Bytes::from(body))).unwrap()
}

fn post_binary(body: Vec<u8>) -> Request<Full<Bytes>> {
    request(Method::POST, Some("application/x-thrift"), None, body)
}

fn content_type(res: &http::Response<Bytes>) -> &str {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

//
// Scenarios
//

#[tokio::test]
async fn non_multiplexed_echo_round_trips() {
    let service = hello_service();
    let body = encode_call(BINARY, "echo", 7, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), "application/x-thrift; protocol=TBINARY");
    let (ident, result) = decode_message(BINARY, res.body(), EchoResult::read_from);
    assert_eq!(ident.name, "echo");
    assert_eq!(ident.message_type, TMessageType::Reply);
    assert_eq!(ident.sequence_number, 7);
    assert_eq!(result.success.as_deref(), Some("hi"));
}

#[tokio::test]
async fn multiplexed_dispatch_routes_by_service_prefix() {
    let service = ThriftHttpService::builder()
        .add_service_named("foo", HelloProcessor::new(TestHello::with(EchoMode::Tagged("foo"))))
        .add_service_named("bar", HelloProcessor::new(TestHello::with(EchoMode::Tagged("bar"))))
        .build()
        .unwrap();

    let body = encode_call(BINARY, "bar:echo", 1, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });
    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (ident, result) = decode_message(BINARY, res.body(), EchoResult::read_from);
    // The reply echoes the full original envelope name by default.
    assert_eq!(ident.name, "bar:echo");
    assert_eq!(ident.sequence_number, 1);
    assert_eq!(result.success.as_deref(), Some("bar:hi"));
}

#[tokio::test]
async fn reply_name_can_strip_the_service_prefix() {
    let service = ThriftHttpService::builder()
        .add_service_named("bar", HelloProcessor::new(TestHello::plain()))
        .qualified_reply_name(false)
        .build()
        .unwrap();

    let body = encode_call(BINARY, "bar:echo", 2, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });
    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    let (ident, _) = decode_message(BINARY, res.body(), EchoResult::read_from);
    assert_eq!(ident.name, "echo");
}

#[tokio::test]
async fn unknown_method_becomes_an_application_exception() {
    let service = hello_service();
    let body = encode_call(BINARY, "nope", 3, |_| Ok(()));

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (ident, error) = decode_application_error(BINARY, res.body());
    assert_eq!(ident.message_type, TMessageType::Exception);
    assert_eq!(ident.sequence_number, 3);
    assert_eq!(error.kind, ApplicationErrorKind::UnknownMethod);
    assert_eq!(error.message, "unknown method: nope");
}

#[tokio::test]
async fn unsupported_content_type_is_rejected_before_decode() {
    let service = hello_service();
    // Deliberately not a Thrift body; it must never be read.
    let res = service
        .serve(
            ctx(),
            request(Method::POST, Some("image/png"), None, vec![0xde, 0xad]),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    assert_eq!(res.body().as_ref(), b"Specified content-type not supported");
}

#[tokio::test]
async fn text_plain_falls_back_to_the_default_format() {
    let service = hello_service();
    let body = encode_call(BINARY, "echo", 4, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });
    let res = service
        .serve(ctx(), request(Method::POST, Some("text/plain"), None, body))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (_, result) = decode_message(BINARY, res.body(), EchoResult::read_from);
    assert_eq!(result.success.as_deref(), Some("hi"));
}

#[tokio::test]
async fn declared_exception_travels_inside_a_reply() {
    let service = ThriftHttpService::of(CalculatorProcessor::new(Arithmetic)).unwrap();
    let body = encode_call(BINARY, "div", 5, |o| DivArgs { num: 6, den: 0 }.write_to(o));

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (ident, result) = decode_message(BINARY, res.body(), DivResult::read_from);
    assert_eq!(ident.message_type, TMessageType::Reply);
    assert_eq!(ident.sequence_number, 5);
    assert!(result.success.is_none());
    let dbz = result.dbz.expect("declared exception field");
    assert_eq!(dbz.message, "6/0");
}

#[tokio::test]
async fn division_succeeds_when_declared_exception_does_not_apply() {
    let service = ThriftHttpService::of(CalculatorProcessor::new(Arithmetic)).unwrap();
    let body = encode_call(BINARY, "div", 6, |o| DivArgs { num: 6, den: 3 }.write_to(o));

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();
    let (_, result) = decode_message(BINARY, res.body(), DivResult::read_from);
    assert_eq!(result.success, Some(2));
    assert!(result.dbz.is_none());
}

#[tokio::test]
async fn accept_header_must_match_the_chosen_format() {
    let service = hello_service();
    let body = encode_call(BINARY, "echo", 8, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });
    let res = service
        .serve(
            ctx(),
            request(
                Method::POST,
                Some("application/x-thrift"),
                Some("application/vnd.apache.thrift.compact"),
                body,
            ),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
}

#[tokio::test]
async fn matching_accept_header_is_allowed() {
    let service = hello_service();
    let body = encode_call(BINARY, "echo", 9, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });
    let res = service
        .serve(
            ctx(),
            request(
                Method::POST,
                Some("application/x-thrift"),
                Some("application/x-thrift, text/plain;q=0.5"),
                body,
            ),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_post_methods_are_rejected() {
    let service = hello_service();
    let res = service
        .serve(
            ctx(),
            request(Method::GET, Some("application/x-thrift"), None, Vec::new()),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn zero_argument_method_round_trips() {
    let service = hello_service();
    let body = encode_call(BINARY, "serial", 10, |o| SerialArgs.write_to(o));

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();
    let (ident, result) = decode_message(BINARY, res.body(), SerialResult::read_from);
    assert_eq!(ident.sequence_number, 10);
    assert_eq!(result.success, Some(47));
}

#[tokio::test]
async fn operands_follow_ascending_field_id_order() {
    let service = ThriftHttpService::of(CalculatorProcessor::new(Arithmetic)).unwrap();
    let body = encode_call(BINARY, "add", 11, |o| AddArgs { a: 2, b: 3 }.write_to(o));

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();
    let (_, result) = decode_message(BINARY, res.body(), AddResult::read_from);
    assert_eq!(result.success, Some(5));
}

#[tokio::test]
async fn oneway_calls_are_acknowledged_with_an_empty_body() {
    let service = hello_service();
    let body = encode_message(BINARY, "ping", TMessageType::OneWay, 12, |o| {
        PingArgs.write_to(o)
    });

    let request_ctx = ctx();
    let res = service
        .serve(Arc::clone(&request_ctx), post_binary(body))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.body().is_empty());
    assert_eq!(content_type(&res), "application/x-thrift; protocol=TBINARY");

    // The reply handle records a null response payload.
    let log = request_ctx.log().snapshot();
    assert!(log.response_content_recorded);
    assert!(log.response_content.is_none());
}

#[tokio::test]
async fn reply_envelopes_are_not_valid_requests() {
    let service = hello_service();
    let body = encode_message(BINARY, "echo", TMessageType::Reply, 13, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (ident, error) = decode_application_error(BINARY, res.body());
    assert_eq!(ident.sequence_number, 13);
    assert_eq!(error.kind, ApplicationErrorKind::InvalidMessageType);
    assert_eq!(error.message, "unexpected TMessageType: REPLY");
}

#[tokio::test]
async fn truncated_arguments_are_a_protocol_error() {
    let service = hello_service();
    let mut body = encode_call(BINARY, "echo", 14, |o| {
        EchoArgs {
            msg: "hello world".into(),
        }
        .write_to(o)
    });
    body.truncate(body.len() - 3);

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (ident, error) = decode_application_error(BINARY, res.body());
    assert_eq!(ident.sequence_number, 14);
    assert_eq!(error.kind, ApplicationErrorKind::ProtocolError);
    assert!(error.message.starts_with("failed to decode arguments:"));
}

#[tokio::test]
async fn garbage_envelopes_are_a_bad_request() {
    let service = hello_service();
    let res = service
        .serve(ctx(), post_binary(vec![0xff; 8]))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    assert_eq!(res.body().as_ref(), b"Failed to decode a binary header");
}

#[tokio::test]
async fn undeclared_exceptions_become_internal_errors() {
    let service = hello_service_with(EchoMode::Undeclared);
    let body = encode_call(BINARY, "echo", 15, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (ident, error) = decode_application_error(BINARY, res.body());
    assert_eq!(ident.sequence_number, 15);
    assert_eq!(error.kind, ApplicationErrorKind::InternalError);
    // Causes stay server-side unless verbose responses are on.
    assert_eq!(error.message, "");
}

#[tokio::test]
async fn verbose_responses_frame_the_server_side_trace() {
    let service = hello_service_with(EchoMode::Undeclared);
    let body = encode_call(BINARY, "echo", 16, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let res = service.serve(verbose_ctx(), post_binary(body)).await.unwrap();

    let (_, error) = decode_application_error(BINARY, res.body());
    assert_eq!(error.kind, ApplicationErrorKind::InternalError);
    assert!(error.message.contains("---- BEGIN server-side trace ----"));
    assert!(error.message.contains("disk on fire"));
    assert!(error.message.contains("---- END server-side trace ----"));
}

#[tokio::test]
async fn handler_panics_follow_the_undeclared_path() {
    let service = hello_service_with(EchoMode::Panic);
    let body = encode_call(BINARY, "echo", 17, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let res = service.serve(verbose_ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let (_, error) = decode_application_error(BINARY, res.body());
    assert_eq!(error.kind, ApplicationErrorKind::InternalError);
    assert!(error.message.contains("handler panicked: echo exploded"));
}

#[tokio::test]
async fn http_status_escape_skips_thrift_framing() {
    let service = hello_service_with(EchoMode::HttpStatus);
    let body = encode_call(BINARY, "echo", 18, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn context_is_current_during_the_handler_call() {
    let service = hello_service_with(EchoMode::CtxProbe);
    let body = encode_call(BINARY, "echo", 19, |o| {
        EchoArgs { msg: "ignored".into() }.write_to(o)
    });

    let res = service.serve(ctx(), post_binary(body)).await.unwrap();
    let (_, result) = decode_message(BINARY, res.body(), EchoResult::read_from);
    assert_eq!(result.success.as_deref(), Some("ctx=true"));
}

#[tokio::test]
async fn compact_format_round_trips() {
    let service = hello_service();
    let body = encode_call(COMPACT, "echo", 20, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let res = service
        .serve(
            ctx(),
            request(
                Method::POST,
                Some("application/x-thrift; protocol=TCOMPACT"),
                None,
                body,
            ),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), "application/x-thrift; protocol=TCOMPACT");
    let (ident, result) = decode_message(COMPACT, res.body(), EchoResult::read_from);
    assert_eq!(ident.sequence_number, 20);
    assert_eq!(result.success.as_deref(), Some("hi"));
}

#[tokio::test]
#[tracing_test::traced_test]
async fn request_log_captures_the_decoded_call() {
    let service = hello_service();
    let body = encode_call(BINARY, "echo", 21, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });

    let request_ctx = ctx();
    service
        .serve(Arc::clone(&request_ctx), post_binary(body))
        .await
        .unwrap();

    let log = request_ctx.log().snapshot();
    assert_eq!(log.serialization_format, Some(BINARY));
    let request_content = log.request_content.expect("decoded call recorded");
    assert!(request_content.contains("HelloService.echo"));
    assert!(log.response_content_recorded);
    assert!(log.response_content.is_some());
    assert!(logs_contain("negotiated serialization format"));
}

//
// Decorators
//

struct Counting {
    inner: Arc<dyn RpcService>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RpcService for Counting {
    async fn serve(
        &self,
        ctx: Arc<ServiceRequestContext>,
        req: RpcRequest,
    ) -> Result<Box<dyn tram_protocol::ThriftResult>, RpcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.serve(ctx, req).await
    }

    fn as_call_service(&self) -> Option<&ThriftCallService> {
        self.inner.as_call_service()
    }
}

#[tokio::test]
async fn decorators_wrap_the_handler_invocation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let observed = Arc::clone(&calls);
    let service = ThriftHttpService::builder()
        .add_service(HelloProcessor::new(TestHello::plain()))
        .decorate(move |inner| {
            Arc::new(Counting {
                inner,
                calls: observed,
            })
        })
        .build()
        .unwrap();

    let body = encode_call(BINARY, "echo", 22, |o| {
        EchoArgs { msg: "hi".into() }.write_to(o)
    });
    let res = service.serve(ctx(), post_binary(body)).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let (_, result) = decode_message(BINARY, res.body(), EchoResult::read_from);
    assert_eq!(result.success.as_deref(), Some("hi"));
}
