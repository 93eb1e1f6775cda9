//! `multipart/form-data` → [`ChunkStream`].
//!
//! A create/update request carries one `coach` part (JSON fields) and any
//! number of `photo` parts. Photo bytes are forwarded chunk by chunk as the
//! body arrives, so the service never sees the whole request at once.

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use bytes::Bytes;
use coach_core::{ChunkStream, CoachChunk, CoachError, CoachResult};
use futures::Stream;
use serde::de::DeserializeOwned;

pub const COACH_PART: &str = "coach";
pub const PHOTO_PART: &str = "photo";

fn multipart_error(err: MultipartError) -> CoachError {
    CoachError::bad_request(format!("Failed to read multipart body: {}", err.body_text()))
}

pub fn map_multipart_rejection(rejection: MultipartRejection) -> CoachError {
    CoachError::bad_request(format!(
        "Expected a multipart/form-data body: {}",
        rejection.body_text()
    ))
}

fn boxed<F, S>(stream: S) -> ChunkStream<F>
where
    S: Stream<Item = CoachResult<CoachChunk<F>>> + Send + 'static,
{
    Box::pin(stream)
}

pub fn chunk_stream<F>(multipart: Multipart) -> ChunkStream<F>
where
    F: DeserializeOwned + Send + 'static,
{
    boxed(async_stream::try_stream! {
        let mut multipart = multipart;
        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                COACH_PART => {
                    let body: Bytes = field.bytes().await.map_err(multipart_error)?;
                    let fields: F = serde_json::from_slice(&body).map_err(|e| {
                        CoachError::bad_request(format!("Invalid `{COACH_PART}` part: {e}"))
                    })?;
                    yield CoachChunk::fields(fields);
                }
                PHOTO_PART => {
                    while let Some(fragment) = field.chunk().await.map_err(multipart_error)? {
                        yield CoachChunk::photo(fragment);
                    }
                }
                other => tracing::debug!(part = other, "ignoring unknown multipart part"),
            }
        }
    })
}
