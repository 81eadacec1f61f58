//! Error maps: which errors map to which response.

use crate::{chain::any_link, context::ErrorContext};
use axum::{http::StatusCode, response::Response};
use std::{error::Error, fmt, marker::PhantomData, sync::Arc};

/// Callback type for custom response actions.
pub type ResponseFn = dyn for<'a> Fn(ErrorContext<'a>) -> Response + Send + Sync;

/// The single response action of an [`ErrorMap`].
#[derive(Clone, Default)]
pub enum ResponseAction {
    /// Nothing configured; a match leaves the response as the handler built it.
    #[default]
    Unset,
    /// Set the status code and write no body.
    Status(StatusCode),
    /// Arbitrary callback.
    Custom(Arc<ResponseFn>),
}

impl ResponseAction {
    pub(crate) fn apply(&self, ctx: ErrorContext<'_>) -> Response {
        match self {
            Self::Unset => ctx.into_response(),
            Self::Status(status) => ctx.status(*status),
            Self::Custom(respond) => (**respond)(ctx),
        }
    }
}

impl fmt::Debug for ResponseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("Unset"),
            Self::Status(status) => f.debug_tuple("Status").field(status).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Something an error chain link can be tested against.
trait Expected: Send + Sync {
    fn is(&self, link: &(dyn Error + 'static)) -> bool;
    fn describe(&self) -> String;
}

/// Expects a link equal to a concrete value.
struct Value<E>(E);

impl<E> Expected for Value<E>
where
    E: Error + PartialEq + Send + Sync + 'static,
{
    fn is(&self, link: &(dyn Error + 'static)) -> bool {
        link.downcast_ref::<E>().is_some_and(|e| *e == self.0)
    }

    fn describe(&self) -> String {
        format!("{:?}", self.0)
    }
}

/// Expects any link of type `E`.
struct OfType<E>(PhantomData<fn() -> E>);

impl<E> Expected for OfType<E>
where
    E: Error + 'static,
{
    fn is(&self, link: &(dyn Error + 'static)) -> bool {
        link.is::<E>()
    }

    fn describe(&self) -> String {
        format!("type {}", std::any::type_name::<E>())
    }
}

/// Expects any link accepted by a predicate.
struct Predicate<F>(F);

impl<F> Expected for Predicate<F>
where
    F: Fn(&(dyn Error + 'static)) -> bool + Send + Sync,
{
    fn is(&self, link: &(dyn Error + 'static)) -> bool {
        (self.0)(link)
    }

    fn describe(&self) -> String {
        "predicate".to_string()
    }
}

/// A set of expected errors paired with one response action.
///
/// ```
/// use axum::http::StatusCode;
/// use errmap::ErrorMap;
///
/// #[derive(Debug, PartialEq, thiserror::Error)]
/// #[error("bad request error")]
/// struct BadRequest;
///
/// let map = ErrorMap::new([BadRequest]).set_status_code(StatusCode::BAD_REQUEST);
/// assert!(map.matches(&BadRequest));
/// ```
#[derive(Clone, Default)]
pub struct ErrorMap {
    expected: Vec<Arc<dyn Expected>>,
    action: ResponseAction,
}

impl ErrorMap {
    /// Map built from values of one error type.
    pub fn new<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Error + PartialEq + Send + Sync + 'static,
    {
        errors
            .into_iter()
            .fold(Self::default(), |map, err| map.expect_error(err))
    }

    /// Expect an error equal to `err`.
    pub fn expect_error<E>(mut self, err: E) -> Self
    where
        E: Error + PartialEq + Send + Sync + 'static,
    {
        self.expected.push(Arc::new(Value(err)));
        self
    }

    /// Expect any error of type `E`.
    pub fn expect_type<E>(mut self) -> Self
    where
        E: Error + 'static,
    {
        self.expected.push(Arc::new(OfType::<E>(PhantomData)));
        self
    }

    /// Expect any error accepted by `pred`.
    pub fn expect_fn<F>(mut self, pred: F) -> Self
    where
        F: Fn(&(dyn Error + 'static)) -> bool + Send + Sync + 'static,
    {
        self.expected.push(Arc::new(Predicate(pred)));
        self
    }

    /// Respond with `status` and no body. Replaces any previous action.
    pub fn set_status_code(mut self, status: StatusCode) -> Self {
        self.action = ResponseAction::Status(status);
        self
    }

    /// Respond with a custom callback. Replaces any previous action.
    pub fn set_response<F>(mut self, respond: F) -> Self
    where
        F: for<'a> Fn(ErrorContext<'a>) -> Response + Send + Sync + 'static,
    {
        self.action = ResponseAction::Custom(Arc::new(respond));
        self
    }

    /// The configured status, when the active action is a status action.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self.action {
            ResponseAction::Status(status) => Some(status),
            _ => None,
        }
    }

    /// The active response action.
    pub fn action(&self) -> &ResponseAction {
        &self.action
    }

    /// Number of expected errors.
    pub fn len(&self) -> usize {
        self.expected.len()
    }

    /// True when nothing is expected; such a map never matches.
    pub fn is_empty(&self) -> bool {
        self.expected.is_empty()
    }

    /// Check `err` and every error it wraps against the expected set.
    pub fn matches(&self, err: &(dyn Error + 'static)) -> bool {
        self.expected
            .iter()
            .any(|expected| any_link(err, |link| expected.is(link)))
    }

    pub(crate) fn respond(&self, ctx: ErrorContext<'_>) -> Response {
        self.action.apply(ctx)
    }
}

impl fmt::Debug for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected: Vec<String> = self.expected.iter().map(|e| e.describe()).collect();
        f.debug_struct("ErrorMap")
            .field("expected", &expected)
            .field("action", &self.action)
            .finish()
    }
}

/// Build an [`ErrorMap`] from expected error values of any types.
///
/// ```
/// # #[derive(Debug, PartialEq, thiserror::Error)]
/// # #[error("not found")]
/// # struct NotFound;
/// # #[derive(Debug, PartialEq, thiserror::Error)]
/// # #[error("gone")]
/// # struct Gone;
/// let map = errmap::error_map![NotFound, Gone];
/// assert_eq!(map.len(), 2);
/// ```
#[macro_export]
macro_rules! error_map {
    () => {
        $crate::ErrorMap::default()
    };
    ($($err:expr),+ $(,)?) => {
        $crate::ErrorMap::default()$(.expect_error($err))+
    };
}
