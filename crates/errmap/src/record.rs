//! Recording handler errors on responses.
//!
//! axum hands the dispatcher a finished response rather than a mutable
//! request context, so the per-request error list travels in the response
//! extensions. Handlers append to it, either by returning [`HandlerError`]
//! or by calling [`RecordErrorExt::record_error`] on a response they build.

use crate::chain::Chain;
use axum::{
    http::{Response, StatusCode},
    response::IntoResponse,
};
use std::{error::Error, fmt, sync::Arc};

/// A shared handle to an error recorded during request handling.
#[derive(Clone)]
pub struct RecordedError(Arc<dyn Error + Send + Sync + 'static>);

impl RecordedError {
    /// Share `err` as a recorded error.
    pub fn new<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Arc::new(err))
    }

    /// Record an `anyhow::Error`, keeping its context chain walkable.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        Self(Arc::new(AnyhowError(err)))
    }

    /// The recorded error itself.
    pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.0
    }

    /// Iterate this error and everything it wraps.
    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self.as_error())
    }

    /// Find the first link of the chain with concrete type `E`.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.chain().find_map(|link| link.downcast_ref::<E>())
    }
}

impl fmt::Debug for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

/// Adapter exposing an `anyhow::Error` through `std::error::Error`.
///
/// The adapter's source is the error anyhow dereferences to, so the walk
/// continues into the context chain and reaches the root cause.
struct AnyhowError(anyhow::Error);

impl fmt::Debug for AnyhowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for AnyhowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for AnyhowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let inner: &(dyn Error + Send + Sync + 'static) = &*self.0;
        Some(inner)
    }
}

/// Ordered list of errors recorded while handling one request.
#[derive(Debug, Clone, Default)]
pub struct RecordedErrors {
    errors: Vec<RecordedError>,
}

impl RecordedErrors {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `err`; it becomes the last error.
    pub fn push(&mut self, err: RecordedError) {
        self.errors.push(err);
    }

    /// The most recently recorded error.
    pub fn last(&self) -> Option<&RecordedError> {
        self.errors.last()
    }

    /// Errors in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &RecordedError> {
        self.errors.iter()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Extension trait for attaching errors to a response.
pub trait RecordErrorExt {
    /// Append an error to the response's recorded errors.
    fn record_error<E>(&mut self, err: E)
    where
        E: Error + Send + Sync + 'static;

    /// Append an already shared error.
    fn record(&mut self, err: RecordedError);

    /// Errors recorded so far, if any.
    fn recorded_errors(&self) -> Option<&RecordedErrors>;

    /// The most recently recorded error.
    fn last_error(&self) -> Option<&RecordedError> {
        self.recorded_errors().and_then(RecordedErrors::last)
    }
}

impl<B> RecordErrorExt for Response<B> {
    fn record_error<E>(&mut self, err: E)
    where
        E: Error + Send + Sync + 'static,
    {
        self.record(RecordedError::new(err));
    }

    fn record(&mut self, err: RecordedError) {
        match self.extensions_mut().get_mut::<RecordedErrors>() {
            Some(errors) => errors.push(err),
            None => {
                let mut errors = RecordedErrors::new();
                errors.push(err);
                self.extensions_mut().insert(errors);
            }
        }
    }

    fn recorded_errors(&self) -> Option<&RecordedErrors> {
        self.extensions().get::<RecordedErrors>()
    }
}

/// Handler return type that records its error on the response.
///
/// Any `std::error::Error` converts with `?`. The response carries
/// `500 Internal Server Error` and no body unless another status is chosen
/// with [`HandlerError::with_status`].
#[derive(Debug, Clone)]
pub struct HandlerError {
    error: RecordedError,
    status: StatusCode,
}

impl HandlerError {
    /// Wrap `err` with the default `500` status.
    pub fn new<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            error: RecordedError::new(err),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap an `anyhow::Error` with the default `500` status.
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        Self {
            error: RecordedError::from_anyhow(err),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status the handler responds with when no error map rewrites it.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Status of the handler's own response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The error to record.
    pub fn error(&self) -> &RecordedError {
        &self.error
    }
}

impl<E> From<E> for HandlerError
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::new(err)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        let mut response = self.status.into_response();
        response.record(self.error);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    #[error("first")]
    struct First;

    #[derive(Debug, Error, PartialEq)]
    #[error("second")]
    struct Second;

    #[derive(Debug, Error)]
    #[error("loading profile")]
    struct Loading(#[source] First);

    #[test]
    fn test_last_is_most_recent() {
        let mut response = Response::new(Body::empty());
        assert!(response.last_error().is_none());

        response.record_error(First);
        response.record_error(Second);

        let errors = response.recorded_errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(response.last_error().unwrap().to_string(), "second");
    }

    #[test]
    fn test_handler_error_response() {
        let response = HandlerError::from(First).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.last_error().unwrap().to_string(), "first");

        let response = HandlerError::new(Second)
            .with_status(StatusCode::CONFLICT)
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_find_walks_chain() {
        let err = RecordedError::new(Loading(First));
        assert_eq!(err.find::<First>(), Some(&First));
        assert!(err.find::<Second>().is_none());
    }

    #[test]
    fn test_anyhow_context_is_walkable() {
        let err = anyhow::Error::new(First).context("reading config");
        let recorded = RecordedError::from_anyhow(err);

        assert_eq!(recorded.to_string(), "reading config");
        assert_eq!(recorded.find::<First>(), Some(&First));
    }

    #[test]
    fn test_handler_error_accessors() {
        let err = HandlerError::new(Loading(First)).with_status(StatusCode::BAD_GATEWAY);
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error().to_string(), "loading profile");
        assert_eq!(err.error().find::<First>(), Some(&First));
    }

    #[test]
    fn test_iter_in_recording_order() {
        let mut errors = RecordedErrors::new();
        assert!(errors.is_empty());

        errors.push(RecordedError::new(First));
        errors.push(RecordedError::new(Second));

        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, ["first", "second"]);
    }
}
