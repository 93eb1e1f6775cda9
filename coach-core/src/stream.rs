use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;

use crate::CoachResult;

/// One message of a streamed create/update request.
///
/// Either part may be absent; transports normally fill at most one.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachChunk<F> {
    pub fields: Option<F>,
    pub photo: Option<Bytes>,
}

impl<F> CoachChunk<F> {
    pub fn fields(fields: F) -> Self {
        Self {
            fields: Some(fields),
            photo: None,
        }
    }

    pub fn photo<B: Into<Bytes>>(photo: B) -> Self {
        Self {
            fields: None,
            photo: Some(photo.into()),
        }
    }

    pub fn empty() -> Self {
        Self {
            fields: None,
            photo: None,
        }
    }
}

/// Ordered stream of request chunks, terminated by end of input.
pub type ChunkStream<F> = Pin<Box<dyn Stream<Item = CoachResult<CoachChunk<F>>> + Send>>;
