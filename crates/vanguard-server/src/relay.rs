//! The streaming relay.
//!
//! Copies the backend's live byte stream into the client response one chunk
//! at a time. Each chunk becomes its own body frame, written and flushed as
//! soon as the source yields it, so partial output is visible long before
//! the stream completes.

use std::convert::Infallible;

use async_stream::stream;
use axum::body::Body;
use bytes::Bytes;
use futures::StreamExt;
use tracing::{debug, error};
use uuid::Uuid;
use vanguard_core::ResponseStream;

/// Wrap a backend stream as a client response body.
///
/// The copy is finite and single-pass: it ends when the source is exhausted
/// or errors. A mid-stream error is logged and truncates the body: the
/// bytes already flushed stand, and no error marker is appended (the caller
/// cannot tell truncation from a clean end once bytes have started flowing).
/// The source is dropped, and with it the backend connection closed, exactly
/// once on every exit path.
pub fn relay_body(mut source: ResponseStream, request_id: Uuid) -> Body {
    let relay = stream! {
        let mut relayed: u64 = 0;
        while let Some(next) = source.next().await {
            match next {
                Ok(chunk) => {
                    relayed += chunk.len() as u64;
                    yield Ok::<Bytes, Infallible>(chunk);
                }
                Err(error) => {
                    error!(
                        %request_id,
                        %error,
                        bytes_relayed = relayed,
                        "mid-stream upstream failure, truncating response"
                    );
                    return;
                }
            }
        }
        debug!(%request_id, bytes_relayed = relayed, "stream relay complete");
    };
    Body::from_stream(relay)
}
