//! Per-request timing in the same `key=value` shape as the `db_op` lines.
//!
//! Development logs every request. Production mirrors the operation
//! interceptor and stays quiet on success, so only 4xx (`WARN`) and 5xx
//! (`ERROR`) responses reach the log.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::config::runtime_env::RuntimeEnv;

/// Logged in place of the route pattern when no route matched.
pub const UNMATCHED_ROUTE: &str = "unmatched";

#[derive(Debug, Clone, Copy)]
pub struct RequestLog {
    env: RuntimeEnv,
}

impl RequestLog {
    pub fn new(env: RuntimeEnv) -> Self {
        Self { env }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = RequestLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddleware {
            service,
            env: self.env,
        }))
    }
}

pub struct RequestLogMiddleware<S> {
    service: S,
    env: RuntimeEnv,
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let env = self.env;
        let method = req.method().to_string();
        let route = req
            .match_pattern()
            .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            log_request(env, &method, &route, status, start.elapsed().as_millis());

            result
        })
    }
}

fn log_request(env: RuntimeEnv, method: &str, route: &str, status: StatusCode, duration_ms: u128) {
    let status = status.as_u16();
    match status {
        500.. => error!(
            "http_req=failed method={method} route={route} status={status} duration_ms={duration_ms} env={env}"
        ),
        400..=499 => warn!(
            "http_req=rejected method={method} route={route} status={status} duration_ms={duration_ms} env={env}"
        ),
        _ if env.is_dev() => info!(
            "http_req method={method} route={route} status={status} duration_ms={duration_ms} env={env}"
        ),
        _ => {}
    }
}
