//! Context handed to custom response actions.

use crate::record::RecordedError;
use axum::{
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::error::Error;

/// The matched request, its error, and the response the handler produced.
///
/// A response action consumes the context and returns the response to send.
pub struct ErrorContext<'a> {
    method: &'a Method,
    uri: &'a Uri,
    error: &'a RecordedError,
    response: Response,
}

impl<'a> ErrorContext<'a> {
    pub(crate) fn new(
        method: &'a Method,
        uri: &'a Uri,
        error: &'a RecordedError,
        response: Response,
    ) -> Self {
        Self {
            method,
            uri,
            error,
            response,
        }
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        self.method
    }

    /// Request URI.
    pub fn uri(&self) -> &Uri {
        self.uri
    }

    /// The last error recorded for this request.
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.error.as_error()
    }

    /// Shared handle to the last error.
    pub fn recorded(&self) -> &RecordedError {
        self.error
    }

    /// The response produced by the downstream handler.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Edit the handler's response in place.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Set the status and keep the handler's headers and body.
    pub fn status(mut self, status: StatusCode) -> Response {
        *self.response.status_mut() = status;
        self.response
    }

    /// Replace the response with a JSON body.
    pub fn json<T>(self, status: StatusCode, body: &T) -> Response
    where
        T: Serialize,
    {
        (status, Json(body)).into_response()
    }

    /// Send the handler's response unchanged.
    pub fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("missing widget")]
    struct MissingWidget;

    #[test]
    fn test_status_keeps_headers() {
        let method = Method::GET;
        let uri: Uri = "/widgets/7".parse().unwrap();
        let error = RecordedError::new(MissingWidget);

        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert("x-handler", "widgets".parse().unwrap());

        let ctx = ErrorContext::new(&method, &uri, &error, response);
        assert_eq!(ctx.uri().path(), "/widgets/7");
        assert_eq!(ctx.error().to_string(), "missing widget");

        let response = ctx.status(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-handler"], "widgets");
    }

    #[test]
    fn test_json_replaces_response() {
        let method = Method::POST;
        let uri: Uri = "/widgets".parse().unwrap();
        let error = RecordedError::new(MissingWidget);

        let ctx = ErrorContext::new(&method, &uri, &error, Response::new(Body::empty()));
        let message = ctx.error().to_string();
        let response = ctx.json(StatusCode::NOT_FOUND, &serde_json::json!({ "error": message }));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_edit_response_in_place() {
        let method = Method::DELETE;
        let uri: Uri = "/widgets/3".parse().unwrap();
        let error = RecordedError::new(MissingWidget);

        let response = Response::new(Body::from("gone"));
        let mut ctx = ErrorContext::new(&method, &uri, &error, response);
        assert!(ctx.recorded().find::<MissingWidget>().is_some());
        assert_eq!(ctx.response().status(), StatusCode::OK);

        ctx.response_mut()
            .headers_mut()
            .insert("x-error", "missing-widget".parse().unwrap());
        *ctx.response_mut().status_mut() = StatusCode::GONE;

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::GONE);
        assert_eq!(response.headers()["x-error"], "missing-widget");
    }
}
