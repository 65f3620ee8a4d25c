//! HTTP request handlers.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use vanguard_core::{ForwardHeaders, RequestPayload};

use crate::error::ApiError;
use crate::relay::relay_body;
use crate::state::AppState;

/// Liveness probe. Always 200, literal `OK`.
pub async fn health() -> &'static str {
    "OK"
}

/// The one field of the caller's JSON the proxy itself looks at: whether the
/// backend response should be delivered as an event stream.
#[derive(Debug, Default, Deserialize)]
struct StreamFlag {
    #[serde(default)]
    stream: bool,
}

fn wants_stream(body: &[u8]) -> bool {
    serde_json::from_slice::<StreamFlag>(body)
        .map(|f| f.stream)
        .unwrap_or(false)
}

/// Completion endpoint: validate, forward, relay.
///
/// The body is treated as opaque bytes end to end; only the allow-listed
/// headers and the `stream` flag are inspected here.
#[instrument(skip_all, fields(request_id))]
pub async fn completion(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(request_id));

    let streaming = wants_stream(&body);
    let payload = RequestPayload::new(body, ForwardHeaders::from_header_map(&headers));
    // Child of the process token: shutdown cancels queued validator waits,
    // while this request's own lifecycle is otherwise tied to its connection.
    let cancel = state.shutdown.child_token();

    debug!(
        bytes = payload.body().len(),
        streaming, "completion request received"
    );

    match state.service.execute(payload, &cancel).await {
        Ok(stream) => {
            let body = relay_body(stream, request_id);
            Ok(completion_response(body, streaming))
        }
        Err(error) => {
            info!(status = %error.status_code(), %error, "request rejected");
            Err(ApiError(error))
        }
    }
}

fn completion_response(body: Body, streaming: bool) -> Response {
    if streaming {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    } else {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
