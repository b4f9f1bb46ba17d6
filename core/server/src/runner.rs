// Copyright AGNTCY Contributors (https://github.com/agntcy)
// SPDX-License-Identifier: Apache-2.0

//! The accept loop: one spawned task per connection, HTTP/1 served by
//! hyper, one fresh [`ServiceRequestContext`] per request.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use tram_service::{ServiceRequestContext, ThriftHttpService};

use crate::config::ServerConfig;
use crate::errors::ServerError;
use crate::signal;

/// Binds the configured address and serves `service` until a shutdown
/// signal arrives. In-flight connections run to completion on their own
/// tasks.
pub async fn serve(config: &ServerConfig, service: Arc<ThriftHttpService>) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.listen.as_str()).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "thrift-over-http server listening");

    loop {
        tokio::select! {
            () = signal::shutdown() => {
                info!("stopping accept loop");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!(error = %e, "failed to accept a connection");
                        continue;
                    }
                };
                debug!(%peer, "accepted connection");
                let service = Arc::clone(&service);
                let verbose_responses = config.verbose_responses;
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);
                    let http_service = service_fn(move |req: Request<Incoming>| {
                        let service = Arc::clone(&service);
                        async move { Ok::<_, Infallible>(handle(service, verbose_responses, req).await) }
                    });
                    if let Err(e) = http1::Builder::new().serve_connection(io, http_service).await {
                        debug!(%peer, error = %e, "connection terminated");
                    }
                });
            }
        }
    }
}

async fn handle(
    service: Arc<ThriftHttpService>,
    verbose_responses: bool,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    let ctx = Arc::new(ServiceRequestContext::new(verbose_responses));
    let res = match service.serve(ctx, req).await {
        Ok(res) => res,
        Err(e) => {
            // Response encoding failed after a parsed envelope; nothing
            // Thrift-framed can be said to the client anymore.
            error!(error = %e, "unrecoverable response-encoding failure");
            let mut res = Response::new(Bytes::new());
            *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            res
        }
    };
    res.map(Full::new)
}
