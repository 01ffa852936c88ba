//! HTTP surface: one fallback handler in front of the dispatcher.
//!
//! Routing lives in the command registry, not in axum: every request lands in
//! the same handler, which hands method, URI and headers to the dispatcher
//! and renders the outcome. Every response is `application/json`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::auth::CHALLENGE;
use crate::dispatch::Dispatcher;
use crate::error::GatewayError;

/// Response header carrying the node command's exit code on a 502.
pub const EXIT_CODE_HEADER: &str = "x-upstream-exit-code";

/// Error body: `{"error":{"kind":"...","message":"..."}}`.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let GatewayError::Authentication = self {
            return (
                status,
                [
                    (header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE)),
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
                ],
            )
                .into_response();
        }

        let exit_code = match &self {
            GatewayError::UpstreamCommand { exit_code, .. } => *exit_code,
            _ => None,
        };
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                kind: self.kind(),
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(envelope)).into_response();
        if let Some(code) = exit_code {
            response
                .headers_mut()
                .insert(HeaderName::from_static(EXIT_CODE_HEADER), HeaderValue::from(code));
        }
        response
    }
}

/// Build the gateway router around a shared dispatcher.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new().fallback(handle).with_state(dispatcher)
}

/// Serve until `cancel` fires, then drain in-flight requests.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, router(dispatcher))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
}

async fn handle(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match dispatcher.dispatch(&method, &uri, &headers).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            body,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
