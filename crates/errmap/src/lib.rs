//! Error map middleware for axum.
//!
//! Handlers record errors on their responses; the [`ErrorMapLayer`] inspects
//! the last recorded error once the handler has finished and rewrites the
//! response using the first [`ErrorMap`] whose expected errors match it,
//! directly or anywhere down its `source()` chain.
//!
//! ```no_run
//! use axum::{http::StatusCode, routing::get, Router};
//! use errmap::{error_layer, ErrorMap, HandlerError};
//!
//! #[derive(Debug, PartialEq, thiserror::Error)]
//! #[error("bad request error")]
//! struct BadRequest;
//!
//! async fn handler() -> Result<(), HandlerError> {
//!     Err(BadRequest.into())
//! }
//!
//! let app: Router = Router::new()
//!     .route("/test", get(handler))
//!     .layer(error_layer([
//!         ErrorMap::new([BadRequest]).set_status_code(StatusCode::BAD_REQUEST),
//!     ]));
//! ```
//!
//! Maps are checked in order and only the first match responds. An error no
//! map recognizes leaves the response exactly as the handler built it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod layer;
pub mod record;
pub mod registry;

pub use chain::Chain;
pub use config::{ConfigLoader, DispatchConfig};
pub use context::ErrorContext;
pub use error::ConfigError;
pub use layer::{error_layer, ErrorMapLayer, ErrorMapMiddleware};
pub use record::{HandlerError, RecordErrorExt, RecordedError, RecordedErrors};
pub use registry::{ErrorMap, ResponseAction, ResponseFn};
