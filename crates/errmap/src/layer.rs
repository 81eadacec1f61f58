//! Error map middleware layer.

use crate::{
    config::DispatchConfig,
    context::ErrorContext,
    record::{RecordErrorExt, RecordedErrors},
    registry::{ErrorMap, ResponseAction},
};
use axum::{
    body::Body,
    extract::Request,
    http::Response,
};
use futures::future::BoxFuture;
use std::{sync::Arc, task::{Context, Poll}};
use tower::{Layer, Service};
use tracing::{debug, trace};

/// Build the error map layer. The first map matching the last recorded error wins.
pub fn error_layer<I>(maps: I) -> ErrorMapLayer
where
    I: IntoIterator<Item = ErrorMap>,
{
    ErrorMapLayer::new(maps)
}

/// Error map layer.
#[derive(Clone)]
pub struct ErrorMapLayer {
    maps: Arc<[ErrorMap]>,
    config: DispatchConfig,
}

impl ErrorMapLayer {
    /// Layer over `maps`, checked in order.
    pub fn new<I>(maps: I) -> Self
    where
        I: IntoIterator<Item = ErrorMap>,
    {
        Self {
            maps: maps.into_iter().collect(),
            config: DispatchConfig::default(),
        }
    }

    /// Replace the dispatch configuration.
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// The maps in match order.
    pub fn maps(&self) -> &[ErrorMap] {
        &self.maps
    }
}

impl<S> Layer<S> for ErrorMapLayer {
    type Service = ErrorMapMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorMapMiddleware {
            inner,
            maps: self.maps.clone(),
            config: self.config.clone(),
        }
    }
}

/// Service produced by [`ErrorMapLayer`].
#[derive(Clone)]
pub struct ErrorMapMiddleware<S> {
    inner: S,
    maps: Arc<[ErrorMap]>,
    config: DispatchConfig,
}

impl<S> Service<Request> for ErrorMapMiddleware<S>
where
    S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let maps = self.maps.clone();
        let config = self.config.clone();
        // Use the service that was polled ready and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let method = req.method().clone();
            let uri = req.uri().clone();

            let mut response = inner.call(req).await?;

            let Some(last) = response.last_error().cloned() else {
                trace!(path = %uri.path(), "No error recorded");
                return Ok(response);
            };

            let Some(index) = maps.iter().position(|map| map.matches(last.as_error())) else {
                if config.log_unmatched {
                    debug!(
                        method = %method,
                        path = %uri.path(),
                        error = %last,
                        "Recorded error matched no error map"
                    );
                }
                return Ok(response);
            };

            debug!(
                method = %method,
                path = %uri.path(),
                error = %last,
                map = index,
                "Recorded error matched error map"
            );

            let map = &maps[index];
            if matches!(map.action(), ResponseAction::Unset) {
                return Ok(response);
            }

            let recorded = response.extensions_mut().remove::<RecordedErrors>();
            let ctx = ErrorContext::new(&method, &uri, &last, response);
            let mut response = map.respond(ctx);

            if config.keep_recorded_errors {
                if let Some(recorded) = recorded {
                    response.extensions_mut().insert(recorded);
                }
            }

            Ok(response)
        })
    }
}
