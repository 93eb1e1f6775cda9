use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    AggregatedCoachView, ChunkStream, Coach, CoachError, CoachResult, CoachWithServices,
    CreateCoachFields, UpdateCoachFields,
};

/// Operations the coach service exposes to the outside world.
///
/// - `create` / `update` → consume a chunk stream, answer once it closes
/// - `get`    → fetch one by id
/// - `remove` → delete one by id (and its photo)
/// - `find`   → list every coach
/// - `find_aggregated` → every coach joined with services, reviews and reviewers
///
/// All methods default to "Method not implemented", so a partial
/// implementation only overrides what it supports. Transports (like
/// coach-axum) depend on this trait only.
#[async_trait]
pub trait CoachApi: Send + Sync {
    async fn create(
        &self,
        _chunks: ChunkStream<CreateCoachFields>,
    ) -> CoachResult<CoachWithServices> {
        Err(CoachError::NotImplemented { method: "create" })
    }

    async fn update(
        &self,
        _chunks: ChunkStream<UpdateCoachFields>,
    ) -> CoachResult<CoachWithServices> {
        Err(CoachError::NotImplemented { method: "update" })
    }

    async fn get(&self, _id: Uuid) -> CoachResult<Coach> {
        Err(CoachError::NotImplemented { method: "get" })
    }

    async fn remove(&self, _id: Uuid) -> CoachResult<Coach> {
        Err(CoachError::NotImplemented { method: "remove" })
    }

    async fn find(&self) -> CoachResult<Vec<Coach>> {
        Err(CoachError::NotImplemented { method: "find" })
    }

    async fn find_aggregated(&self) -> CoachResult<Vec<AggregatedCoachView>> {
        Err(CoachError::NotImplemented {
            method: "find_aggregated",
        })
    }
}
