use std::sync::Arc;

use async_trait::async_trait;
use coach_blob::{BlobError, BlobStore, PhotoKeys};
use coach_core::{
    AggregatedCoachView, ChunkStream, Coach, CoachApi, CoachError, CoachRepository, CoachResult,
    CoachWithServices, CreateCoachFields, UpdateCoachCommand, UpdateCoachFields,
};
use uuid::Uuid;

use crate::aggregator::{JoinAggregator, LinkMode};
use crate::ingest::{reassemble, IngestLimits};
use crate::saga::Saga;

/// Blob failures surface as remote failures, except an unparseable photo
/// reference which keeps its own variant.
fn blob_error(call: &'static str, err: BlobError) -> CoachError {
    match err {
        BlobError::MalformedReference { reference } => CoachError::malformed_reference(reference),
        other => {
            tracing::error!(call, error = %other, "blob store call failed");
            CoachError::remote(call, other)
        }
    }
}

/// Coach CRUD over the relational store and the photo store.
///
/// Writes touching both stores register compensations in a [`Saga`] so a
/// failed persist does not leave an orphaned or missing photo behind.
pub struct CoachService {
    repository: Arc<dyn CoachRepository>,
    blobs: Arc<dyn BlobStore>,
    aggregator: JoinAggregator,
    keys: PhotoKeys,
    limits: IngestLimits,
}

impl CoachService {
    pub fn new(
        repository: Arc<dyn CoachRepository>,
        blobs: Arc<dyn BlobStore>,
        aggregator: JoinAggregator,
    ) -> Self {
        Self {
            repository,
            blobs,
            aggregator,
            keys: PhotoKeys::default(),
            limits: IngestLimits::default(),
        }
    }

    pub fn with_keys(mut self, keys: PhotoKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_limits(mut self, limits: IngestLimits) -> Self {
        self.limits = limits;
        self
    }

    pub async fn create_coach(
        &self,
        chunks: ChunkStream<CreateCoachFields>,
    ) -> CoachResult<CoachWithServices> {
        let (fields, photo) = reassemble(chunks, self.limits).await?;
        let id = Uuid::new_v4();
        let mut saga = Saga::new("create_coach");

        let mut location = String::new();
        if !photo.is_empty() {
            let key = self.keys.object_key(&id);
            let put = self
                .blobs
                .put(&key, None, photo)
                .await
                .map_err(|e| blob_error("blob.put", e))?;
            location = put.location;

            let blobs = Arc::clone(&self.blobs);
            saga.on_rollback("delete uploaded photo", async move {
                blobs
                    .delete(&key)
                    .await
                    .map_err(|e| blob_error("blob.delete", e))
            });
        }

        let coach = Coach::new(id, fields.name, fields.description, location);
        let coach = match self.repository.create(coach).await {
            Ok(coach) => coach,
            Err(err) => return Err(saga.rollback(err).await),
        };
        saga.commit();
        tracing::info!(coach_id = %coach.id, has_photo = coach.has_photo(), "coach created");

        let services = self
            .aggregator
            .attach_services(&coach, &fields.service_ids, LinkMode::Link)
            .await?;
        Ok(CoachWithServices { coach, services })
    }

    pub async fn update_coach(
        &self,
        chunks: ChunkStream<UpdateCoachFields>,
    ) -> CoachResult<CoachWithServices> {
        let (fields, photo) = reassemble(chunks, self.limits).await?;
        let existing = self.repository.get_by_id(fields.id).await?;
        let mut saga = Saga::new("update_coach");

        let mut cmd = UpdateCoachCommand::new(existing.id);
        cmd.name = fields.name;
        cmd.description = fields.description;

        if !photo.is_empty() {
            if existing.has_photo() {
                let old_key = self
                    .keys
                    .key_from_reference(&existing.photo)
                    .map_err(|e| blob_error("blob.key", e))?;

                if self
                    .blobs
                    .exists(&old_key)
                    .await
                    .map_err(|e| blob_error("blob.exists", e))?
                {
                    let previous = self
                        .blobs
                        .get(&old_key)
                        .await
                        .map_err(|e| blob_error("blob.get", e))?;
                    self.blobs
                        .delete(&old_key)
                        .await
                        .map_err(|e| blob_error("blob.delete", e))?;

                    let blobs = Arc::clone(&self.blobs);
                    saga.on_rollback("restore previous photo", async move {
                        blobs
                            .put(&old_key, None, previous)
                            .await
                            .map(|_| ())
                            .map_err(|e| blob_error("blob.put", e))
                    });
                }
            }

            let new_key = self.keys.fresh_key();
            match self.blobs.put(&new_key, None, photo).await {
                Ok(put) => cmd.photo = put.location,
                Err(err) => return Err(saga.rollback(blob_error("blob.put", err)).await),
            }
        }

        if let Err(err) = self.repository.update(&cmd).await {
            return Err(saga.rollback(err).await);
        }
        saga.commit();

        let coach = self.repository.get_by_id(existing.id).await?;
        tracing::info!(coach_id = %coach.id, photo_replaced = !cmd.photo.is_empty(), "coach updated");

        let service_ids = fields.service_ids.unwrap_or_default();
        let services = self
            .aggregator
            .attach_services(&coach, &service_ids, LinkMode::Relink)
            .await?;
        Ok(CoachWithServices { coach, services })
    }

    /// Delete the record, then its photo. An empty photo never reaches the
    /// blob store.
    pub async fn delete_coach(&self, id: Uuid) -> CoachResult<Coach> {
        let coach = self.repository.get_by_id(id).await?;
        self.repository.delete(id).await?;

        if coach.has_photo() {
            let key = self
                .keys
                .key_from_reference(&coach.photo)
                .map_err(|e| blob_error("blob.key", e))?;
            self.blobs
                .delete(&key)
                .await
                .map_err(|e| blob_error("blob.delete", e))?;
        }

        tracing::info!(coach_id = %id, "coach deleted");
        Ok(coach)
    }

    pub async fn get_coach(&self, id: Uuid) -> CoachResult<Coach> {
        self.repository.get_by_id(id).await
    }

    pub async fn list_coaches(&self) -> CoachResult<Vec<Coach>> {
        self.repository.list_all().await
    }

    pub fn aggregator(&self) -> &JoinAggregator {
        &self.aggregator
    }
}

#[async_trait]
impl CoachApi for CoachService {
    async fn create(
        &self,
        chunks: ChunkStream<CreateCoachFields>,
    ) -> CoachResult<CoachWithServices> {
        self.create_coach(chunks).await
    }

    async fn update(
        &self,
        chunks: ChunkStream<UpdateCoachFields>,
    ) -> CoachResult<CoachWithServices> {
        self.update_coach(chunks).await
    }

    async fn get(&self, id: Uuid) -> CoachResult<Coach> {
        self.get_coach(id).await
    }

    async fn remove(&self, id: Uuid) -> CoachResult<Coach> {
        self.delete_coach(id).await
    }

    async fn find(&self) -> CoachResult<Vec<Coach>> {
        self.list_coaches().await
    }

    async fn find_aggregated(&self) -> CoachResult<Vec<AggregatedCoachView>> {
        self.aggregator.aggregate_all().await
    }
}
