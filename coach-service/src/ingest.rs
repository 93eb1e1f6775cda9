//! Rebuilds "structured fields + photo" from a stream of partial messages.

use bytes::{Bytes, BytesMut};
use coach_core::{ChunkStream, CoachChunk, CoachError, CoachResult, StructuredPayload};
use futures::StreamExt;

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    pub max_photo_bytes: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }
}

/// Accumulated state of one streamed request.
///
/// Keeps the first non-empty structured payload and every non-empty photo
/// fragment, in arrival order.
#[derive(Debug)]
pub struct PendingUpload<F> {
    fields: Option<F>,
    photo: BytesMut,
    limits: IngestLimits,
}

impl<F: StructuredPayload> PendingUpload<F> {
    pub fn new(limits: IngestLimits) -> Self {
        Self {
            fields: None,
            photo: BytesMut::new(),
            limits,
        }
    }

    pub fn accept(&mut self, chunk: CoachChunk<F>) -> CoachResult<()> {
        if let Some(fields) = chunk.fields {
            if fields.is_empty() {
                tracing::debug!("ignoring empty structured payload");
            } else if self.fields.is_none() {
                self.fields = Some(fields);
            } else {
                tracing::debug!("ignoring structured payload after the first");
            }
        }

        if let Some(fragment) = chunk.photo {
            if fragment.is_empty() {
                return Ok(());
            }
            if self.photo.len() + fragment.len() > self.limits.max_photo_bytes {
                return Err(CoachError::bad_request(format!(
                    "photo exceeds {} bytes",
                    self.limits.max_photo_bytes
                )));
            }
            self.photo.extend_from_slice(&fragment);
        }
        Ok(())
    }

    pub fn photo_len(&self) -> usize {
        self.photo.len()
    }

    /// Close the upload. Without a structured payload the request is rejected.
    pub fn finish(self) -> CoachResult<(F, Bytes)> {
        let fields = self.fields.ok_or(CoachError::EmptyPayload)?;
        Ok((fields, self.photo.freeze()))
    }
}

/// Drain `chunks` until end of stream.
///
/// An empty returned `Bytes` means the request carried no photo.
pub async fn reassemble<F: StructuredPayload>(
    mut chunks: ChunkStream<F>,
    limits: IngestLimits,
) -> CoachResult<(F, Bytes)> {
    let mut pending = PendingUpload::new(limits);
    while let Some(chunk) = chunks.next().await {
        pending.accept(chunk?)?;
    }
    tracing::debug!(photo_bytes = pending.photo_len(), "chunk stream closed");
    pending.finish()
}
