//! coach-service: the coach service's behaviour, independent of transport.
//!
//! - [`ingest`]: rebuilds a request from its chunk stream
//! - [`saga`]: compensation for writes spanning the relational and blob stores
//! - [`CoachService`]: create / update / delete / get / list flows
//! - [`JoinAggregator`]: coaches joined with services, reviews and reviewers

pub mod aggregator;
mod coach_service;
pub mod ingest;
pub mod saga;

pub use aggregator::{JoinAggregator, LinkMode};
pub use coach_service::CoachService;
pub use ingest::{reassemble, IngestLimits, PendingUpload, DEFAULT_MAX_PHOTO_BYTES};
pub use saga::Saga;
