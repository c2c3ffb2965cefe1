// src/server/handler.rs
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower::Service;

use crate::inspect::ProxyInspector;

const INFO_ROUTE: &str = "/proxy/info";
const HEALTH_ROUTE: &str = "/health";

#[derive(Clone)]
pub struct RequestHandler {
    inspector: Arc<ProxyInspector>,
    request_timeout: Duration,
}

impl RequestHandler {
    pub fn new(inspector: Arc<ProxyInspector>, request_timeout: Duration) -> Self {
        Self {
            inspector,
            request_timeout,
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        match tokio::time::timeout(self.request_timeout, self.route(req)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(timeout = ?self.request_timeout, "request timed out");
                error_response(StatusCode::GATEWAY_TIMEOUT, "request timed out")
            }
        }
    }

    async fn route(&self, req: Request<Body>) -> Response<Body> {
        // Drop the body up front; only the request line matters here.
        let (parts, _body) = req.into_parts();
        let path = parts.uri.path();

        if path == HEALTH_ROUTE {
            return if parts.method == Method::GET {
                text_response(StatusCode::OK, "ok")
            } else {
                error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
            };
        }

        let Some(rest) = path.strip_prefix(INFO_ROUTE) else {
            return error_response(StatusCode::NOT_FOUND, "not found");
        };
        let segment = match rest {
            "" | "/" => "",
            _ => match rest.strip_prefix('/') {
                Some(segment) if !segment.contains('/') => segment,
                _ => return error_response(StatusCode::NOT_FOUND, "not found"),
            },
        };

        if parts.method != Method::GET {
            return error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
        }

        let proxy = match percent_decode_str(segment).decode_utf8() {
            Ok(proxy) => proxy,
            Err(_) => {
                return error_response(StatusCode::BAD_REQUEST, "proxy address is not valid UTF-8")
            }
        };

        match self.inspector.inspect(&proxy).await {
            Ok(info) => json_response(StatusCode::OK, &info),
            Err(err) => {
                tracing::debug!(%err, "rejected proxy address");
                error_response(StatusCode::BAD_REQUEST, &err.to_string())
            }
        }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(req).await) })
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            tracing::error!(%err, "failed to serialize response");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response<Body> {
    json_response(status, &ErrorBody { error: message })
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    response
}
