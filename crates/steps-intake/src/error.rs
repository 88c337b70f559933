use crate::config::{AppEnvironment, ConfigError};
use crate::preferences::PreferenceError;
use crate::relay::DispatchError;
use crate::storage::StorageError;
use crate::telemetry::TelemetryError;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use futures::FutureExt;
use serde_json::json;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Preference(PreferenceError),
    Storage(StorageError),
    Relay(DispatchError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Preference(err) => write!(f, "preference error: {}", err),
            AppError::Storage(err) => write!(f, "storage client error: {}", err),
            AppError::Relay(err) => write!(f, "email relay error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Preference(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Relay(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Relay(_) | AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Preference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PreferenceError> for AppError {
    fn from(value: PreferenceError) -> Self {
        Self::Preference(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<DispatchError> for AppError {
    fn from(value: DispatchError) -> Self {
        Self::Relay(value)
    }
}

pub const FALLBACK_TITLE: &str = "Oops! Something went wrong";
pub const FALLBACK_HINT: &str = "We apologize for the inconvenience. Please try refreshing the page or contact support if the problem persists.";
pub const FALLBACK_ACTION: &str = "Refresh Page";

/// Last-resort renderer for failures nothing else handled.
///
/// Visitors always get the same apologetic payload. Raw error text and its source chain are
/// only included in development.
#[derive(Debug, Clone, Copy)]
pub struct ErrorBoundary {
    disclose_details: bool,
}

impl ErrorBoundary {
    pub fn new(disclose_details: bool) -> Self {
        Self { disclose_details }
    }

    pub fn for_environment(environment: AppEnvironment) -> Self {
        Self::new(environment == AppEnvironment::Development)
    }

    pub fn render(&self, error: &(dyn std::error::Error + 'static)) -> Response {
        tracing::error!(error = %error, "unhandled error reached the boundary");

        let mut body = json!({
            "error": FALLBACK_TITLE,
            "hint": FALLBACK_HINT,
            "action": FALLBACK_ACTION,
        });
        if self.disclose_details {
            body["details"] = json!({
                "message": error.to_string(),
                "chain": source_chain(error),
            });
        }
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }

    /// Renders a handler panic through the same fallback payload.
    pub fn render_panic(&self, payload: Box<dyn Any + Send + 'static>) -> Response {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        self.render(&HandlerPanic { message })
    }

    /// Wraps every route of `router` so a panicking handler still answers with the fallback.
    pub fn install(self, router: Router) -> Router {
        router.layer(middleware::from_fn_with_state(self, catch_panics))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("request handler panicked: {message}")]
struct HandlerPanic {
    message: String,
}

async fn catch_panics(
    State(boundary): State<ErrorBoundary>,
    request: Request,
    next: Next,
) -> Response {
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => boundary.render_panic(payload),
    }
}

fn source_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}
