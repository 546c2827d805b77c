//! Authentication and failure boundary wrapped around every API route.
//!
//! Requests without a matching credential are answered with a fixed 401 and
//! never reach the handler. Anything a handler fails with, whether an
//! [`ApiError`] or a panic, becomes a 500 whose body names the request path
//! and carries the captured trace. Both the success and the failure paths echo
//! the credential back as a cookie; the 401 path does not.

use super::{
    handlers::AppState,
    status::{UNAUTHORISED, UNEXPECTED_ERROR},
};
use crate::{Error, auth};
use axum::{
    extract::{Request, State},
    http::{HeaderValue, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::{
    any::Any,
    backtrace::Backtrace,
    cell::RefCell,
    error::Error as _,
    fmt::Write,
    panic::{self, AssertUnwindSafe},
    sync::Once,
};
use tracing::{error, warn};

pub const UNAUTHORISED_BODY: &str = "Request failed to authenticate.";

static PANIC_HOOK: Once = Once::new();

thread_local! {
    // Location and backtrace of the last panic on this thread, taken while
    // the panicking frames are still on the stack.
    static PANIC_SITE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Installs a process-wide panic hook that records where a panic happened
/// before unwinding, then defers to the previously installed hook.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| l.to_string())
                .unwrap_or_else(|| "unknown location".to_string());
            let site = format!(
                "panicked at {}\n\nStack backtrace:\n{}",
                location,
                Backtrace::force_capture()
            );
            let _ = PANIC_SITE.try_with(|slot| *slot.borrow_mut() = Some(site));
            previous(info);
        }));
    });
}

/// Error returned by route handlers.
///
/// The backtrace is taken where the error is converted, so `?` inside a
/// handler records the failing call site.
#[derive(Debug)]
pub struct ApiError {
    error: Error,
    backtrace: Backtrace,
}

impl<E> From<E> for ApiError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self {
            error: err.into(),
            backtrace: Backtrace::force_capture(),
        }
    }
}

impl ApiError {
    /// Error message, its source chain and the backtrace.
    pub fn trace(&self) -> String {
        let mut trace = format!("Error: {}", self.error);

        let mut source = self.error.source();
        if source.is_some() {
            trace.push_str("\n\nCaused by:");
        }
        while let Some(cause) = source {
            let _ = write!(trace, "\n    {}", cause);
            source = cause.source();
        }

        let _ = write!(trace, "\n\nStack backtrace:\n{}", self.backtrace);
        trace
    }
}

/// Marker left on a handler's response so the boundary can rebuild it with
/// the request path.
#[derive(Debug, Clone)]
pub struct HandlerFailure {
    pub trace: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = UNEXPECTED_ERROR.into_response();
        response.extensions_mut().insert(HandlerFailure {
            trace: self.trace(),
        });
        response
    }
}

pub async fn safe_api_call(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let outcome = auth::validate_authentication(
        request.uri(),
        request.headers(),
        &state.config.api_key,
    );

    if !outcome.valid {
        warn!("Rejected unauthenticated call to {}", request.uri().path());
        return unauthorised();
    }

    let path = request.uri().path().to_string();

    let mut response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(mut response) => match response.extensions_mut().remove::<HandlerFailure>() {
            Some(failure) => failure_response(&path, &failure.trace),
            None => response,
        },
        Err(panic) => failure_response(&path, &panic_trace(panic.as_ref())),
    };

    set_credential_cookie(&mut response, &outcome.credential);
    response
}

pub fn unauthorised() -> Response {
    (UNAUTHORISED, UNAUTHORISED_BODY).into_response()
}

fn failure_response(path: &str, trace: &str) -> Response {
    let message = format!("Exception in call to {}\n\n{}", path, trace);
    error!("{}", message);
    (UNEXPECTED_ERROR, message).into_response()
}

fn panic_trace(payload: &(dyn Any + Send)) -> String {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    // Without the hook only the boundary's own stack is available
    let site = PANIC_SITE
        .try_with(|slot| slot.borrow_mut().take())
        .ok()
        .flatten()
        .unwrap_or_else(|| format!("Stack backtrace:\n{}", Backtrace::force_capture()));

    format!("Handler panicked: {}\n\n{}", reason, site)
}

fn set_credential_cookie(response: &mut Response, credential: &str) {
    let cookie = format!("{}={}; Path=/", auth::API_KEY, credential);
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => warn!("Credential cannot be sent back as a cookie: {}", e),
    }
}
