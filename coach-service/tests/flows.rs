use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use coach_blob::{BlobError, BlobResult, BlobStore, MemoryBlobStore, PhotoKeys, PutResult};
use coach_core::{
    ChunkStream, Coach, CoachChunk, CoachError, CoachRepository, CoachResult, CreateCoachFields,
    MemoryCoachRepository, ReviewDirectory, ReviewRef, ReviewsByCoach, ServiceDirectory,
    ServiceRef, Severity, UpdateCoachCommand, UpdateCoachFields, UserDirectory, UserRef, UsersById,
};
use coach_remote::MemoryDirectory;
use coach_service::{CoachService, JoinAggregator};
use uuid::Uuid;

struct FailingRepository {
    inner: MemoryCoachRepository,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
}

#[async_trait]
impl CoachRepository for FailingRepository {
    async fn create(&self, coach: Coach) -> CoachResult<Coach> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(CoachError::remote("coach_repository.create", "connection refused"));
        }
        self.inner.create(coach).await
    }

    async fn get_by_id(&self, id: Uuid) -> CoachResult<Coach> {
        self.inner.get_by_id(id).await
    }

    async fn update(&self, cmd: &UpdateCoachCommand) -> CoachResult<()> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(CoachError::remote("coach_repository.update", "connection refused"));
        }
        self.inner.update(cmd).await
    }

    async fn delete(&self, id: Uuid) -> CoachResult<()> {
        self.inner.delete(id).await
    }

    async fn list_all(&self) -> CoachResult<Vec<Coach>> {
        self.inner.list_all().await
    }
}

/// Blob store whose puts follow a script of outcomes (`true` = succeed) and
/// succeed once the script runs out.
struct FlakyBlobStore {
    inner: MemoryBlobStore,
    put_outcomes: Mutex<VecDeque<bool>>,
    fail_delete: AtomicBool,
}

impl FlakyBlobStore {
    fn script_puts(&self, outcomes: &[bool]) {
        *self.put_outcomes.lock().unwrap() = outcomes.iter().copied().collect();
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn put(&self, key: &str, content_type: Option<&str>, data: Bytes) -> BlobResult<PutResult> {
        let succeed = self.put_outcomes.lock().unwrap().pop_front().unwrap_or(true);
        if !succeed {
            return Err(BlobError::invalid("bucket is read-only"));
        }
        self.inner.put(key, content_type, data).await
    }

    async fn get(&self, key: &str) -> BlobResult<Bytes> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BlobError::invalid("bucket is read-only"));
        }
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        self.inner.exists(key).await
    }
}

struct DownReviews;

#[async_trait]
impl ReviewDirectory for DownReviews {
    async fn reviews_by_coach_ids(&self, _coach_ids: &[String]) -> CoachResult<ReviewsByCoach> {
        Err(CoachError::remote("reviews.reviews_by_coach_ids", "503"))
    }
}

struct DownUsers;

#[async_trait]
impl UserDirectory for DownUsers {
    async fn users_by_ids(&self, _user_ids: &[String]) -> CoachResult<UsersById> {
        Err(CoachError::remote("users.users_by_ids", "503"))
    }
}

struct Harness {
    repository: Arc<FailingRepository>,
    blobs: Arc<FlakyBlobStore>,
    directory: Arc<MemoryDirectory>,
    service: CoachService,
}

fn harness() -> Harness {
    harness_with_bucket("fitness")
}

fn harness_with_bucket(bucket: &str) -> Harness {
    let repository = Arc::new(FailingRepository {
        inner: MemoryCoachRepository::new(),
        fail_create: AtomicBool::new(false),
        fail_update: AtomicBool::new(false),
    });
    let blobs = Arc::new(FlakyBlobStore {
        inner: MemoryBlobStore::new(bucket),
        put_outcomes: Mutex::new(VecDeque::new()),
        fail_delete: AtomicBool::new(false),
    });
    let directory = Arc::new(MemoryDirectory::new());
    let aggregator = JoinAggregator::new(
        repository.clone(),
        directory.clone(),
        directory.clone(),
        directory.clone(),
    );
    let service = CoachService::new(repository.clone(), blobs.clone(), aggregator);

    Harness {
        repository,
        blobs,
        directory,
        service,
    }
}

fn chunks<F: Send + 'static>(items: Vec<CoachChunk<F>>) -> ChunkStream<F> {
    Box::pin(futures::stream::iter(items.into_iter().map(Ok)))
}

fn create_fields(name: &str) -> CreateCoachFields {
    CreateCoachFields {
        name: name.into(),
        description: format!("{name} teaches"),
        service_ids: Vec::new(),
    }
}

fn update_fields(id: Uuid, name: &str) -> UpdateCoachFields {
    UpdateCoachFields {
        id,
        name: name.into(),
        description: String::new(),
        service_ids: None,
    }
}

async fn create_with_photo(h: &Harness, name: &str, photo: &'static [u8]) -> Coach {
    h.service
        .create_coach(chunks(vec![
            CoachChunk::fields(create_fields(name)),
            CoachChunk::photo(photo),
        ]))
        .await
        .unwrap()
        .coach
}

#[tokio::test]
async fn create_stores_photo_under_coach_key_and_links_services() {
    let h = harness();
    h.directory
        .add_service(ServiceRef {
            id: "s1".into(),
            title: "Yoga".into(),
            photo: String::new(),
        })
        .await;

    let created = h
        .service
        .create_coach(chunks(vec![
            CoachChunk::fields(CreateCoachFields {
                service_ids: vec!["s1".into()],
                ..create_fields("Alex")
            }),
            CoachChunk::photo(&b"pn"[..]),
            CoachChunk::photo(&b"g"[..]),
        ]))
        .await
        .unwrap();

    let key = format!("coach/{}", created.coach.id);
    assert_eq!(created.coach.photo, format!("memory://fitness/{key}"));
    assert_eq!(h.blobs.get(&key).await.unwrap(), Bytes::from_static(b"png"));
    assert_eq!(created.services.len(), 1);
    assert_eq!(created.services[0].title, "Yoga");
    assert_eq!(h.repository.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_without_photo_never_touches_blob_store() {
    let h = harness();
    let created = h
        .service
        .create_coach(chunks(vec![CoachChunk::fields(create_fields("Alex"))]))
        .await
        .unwrap();

    assert!(created.coach.photo.is_empty());
    assert!(created.services.is_empty());
    assert_eq!(h.blobs.inner.calls(), 0);
}

#[tokio::test]
async fn create_persist_failure_leaves_no_orphaned_blob() {
    let h = harness();
    h.repository.fail_create.store(true, Ordering::SeqCst);

    let err = h
        .service
        .create_coach(chunks(vec![
            CoachChunk::fields(create_fields("Alex")),
            CoachChunk::photo(&b"png"[..]),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, CoachError::RemoteCallFailed { call: "coach_repository.create", .. }));
    // put followed by the compensating delete
    assert_eq!(h.blobs.inner.calls(), 2);
    assert!(h.blobs.inner.is_empty().await);
}

#[tokio::test]
async fn failed_create_compensation_is_reported_as_critical() {
    let h = harness();
    h.repository.fail_create.store(true, Ordering::SeqCst);
    h.blobs.fail_delete.store(true, Ordering::SeqCst);

    let err = h
        .service
        .create_coach(chunks(vec![
            CoachChunk::fields(create_fields("Alex")),
            CoachChunk::photo(&b"png"[..]),
        ]))
        .await
        .unwrap_err();

    assert_eq!(err.severity(), Severity::Critical);
    assert_eq!(err.code(), 500);
    assert!(matches!(err, CoachError::CompensationFailed { .. }));
}

#[tokio::test]
async fn empty_stream_is_rejected_before_any_write() {
    let h = harness();
    let err = h
        .service
        .create_coach(chunks(vec![CoachChunk::photo(&b"png"[..])]))
        .await
        .unwrap_err();

    assert!(matches!(err, CoachError::EmptyPayload));
    assert_eq!(h.blobs.inner.calls(), 0);
    assert!(h.repository.inner.is_empty().await);
}

#[tokio::test]
async fn update_writes_photo_under_fresh_key() {
    let h = harness();
    let keys = PhotoKeys::default();
    let coach = create_with_photo(&h, "Alex", b"old").await;
    let old_key = keys.key_from_reference(&coach.photo).unwrap();

    let updated = h
        .service
        .update_coach(chunks(vec![
            CoachChunk::fields(update_fields(coach.id, "")),
            CoachChunk::photo(&b"new"[..]),
        ]))
        .await
        .unwrap()
        .coach;

    let new_key = keys.key_from_reference(&updated.photo).unwrap();
    assert_ne!(new_key, old_key);
    assert!(!h.blobs.exists(&old_key).await.unwrap());
    assert_eq!(h.blobs.get(&new_key).await.unwrap(), Bytes::from_static(b"new"));

    // the coach-id key is free again and reusing it does not disturb the new photo
    h.blobs
        .put(&old_key, None, Bytes::from_static(b"unrelated"))
        .await
        .unwrap();
    assert_eq!(h.blobs.get(&new_key).await.unwrap(), Bytes::from_static(b"new"));
    assert_eq!(updated.name, "Alex");
    assert_eq!(updated.description, coach.description);
}

#[tokio::test]
async fn update_reassembles_fields_and_fragments() {
    let h = harness();
    let coach = create_with_photo(&h, "Alex", b"old").await;

    let updated = h
        .service
        .update_coach(chunks(vec![
            CoachChunk::fields(update_fields(coach.id, "New")),
            CoachChunk::photo(&b"ab"[..]),
            CoachChunk::photo(&b"cd"[..]),
        ]))
        .await
        .unwrap()
        .coach;

    let key = PhotoKeys::default().key_from_reference(&updated.photo).unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(h.blobs.get(&key).await.unwrap(), Bytes::from_static(b"abcd"));
    assert!(updated.updated_time >= coach.updated_time);
}

#[tokio::test]
async fn update_persist_failure_restores_previous_photo() {
    let h = harness();
    let keys = PhotoKeys::default();
    let coach = create_with_photo(&h, "Alex", b"old").await;
    let old_key = keys.key_from_reference(&coach.photo).unwrap();
    h.repository.fail_update.store(true, Ordering::SeqCst);

    let err = h
        .service
        .update_coach(chunks(vec![
            CoachChunk::fields(update_fields(coach.id, "New")),
            CoachChunk::photo(&b"new"[..]),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, CoachError::RemoteCallFailed { call: "coach_repository.update", .. }));
    assert_eq!(h.blobs.get(&old_key).await.unwrap(), Bytes::from_static(b"old"));
    assert_eq!(h.service.get_coach(coach.id).await.unwrap(), coach);
}

#[tokio::test]
async fn failed_photo_restore_after_update_failure_is_critical() {
    let h = harness();
    let keys = PhotoKeys::default();
    let coach = create_with_photo(&h, "Alex", b"old").await;
    let old_key = keys.key_from_reference(&coach.photo).unwrap();
    h.repository.fail_update.store(true, Ordering::SeqCst);
    // new photo lands, the restore of the old one does not
    h.blobs.script_puts(&[true, false]);

    let err = h
        .service
        .update_coach(chunks(vec![
            CoachChunk::fields(update_fields(coach.id, "New")),
            CoachChunk::photo(&b"new"[..]),
        ]))
        .await
        .unwrap_err();

    assert_eq!(err.severity(), Severity::Critical);
    assert_eq!(err.code(), 500);
    match err {
        CoachError::CompensationFailed { original, compensation } => {
            assert!(matches!(*original, CoachError::RemoteCallFailed { call: "coach_repository.update", .. }));
            assert!(matches!(*compensation, CoachError::RemoteCallFailed { call: "blob.put", .. }));
        }
        other => panic!("expected CompensationFailed, got {other:?}"),
    }
    assert!(!h.blobs.exists(&old_key).await.unwrap());
}

#[tokio::test]
async fn failed_new_photo_upload_restores_previous_photo() {
    let h = harness();
    let keys = PhotoKeys::default();
    let coach = create_with_photo(&h, "Alex", b"old").await;
    let old_key = keys.key_from_reference(&coach.photo).unwrap();
    h.blobs.script_puts(&[false]);

    let err = h
        .service
        .update_coach(chunks(vec![
            CoachChunk::fields(update_fields(coach.id, "New")),
            CoachChunk::photo(&b"new"[..]),
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, CoachError::RemoteCallFailed { call: "blob.put", .. }));
    assert_eq!(h.blobs.get(&old_key).await.unwrap(), Bytes::from_static(b"old"));
    assert_eq!(h.service.get_coach(coach.id).await.unwrap(), coach);
}

#[tokio::test]
async fn update_of_missing_coach_fails_before_blob_mutation() {
    let h = harness();
    let err = h
        .service
        .update_coach(chunks(vec![
            CoachChunk::fields(update_fields(Uuid::new_v4(), "New")),
            CoachChunk::photo(&b"new"[..]),
        ]))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(h.blobs.inner.calls(), 0);
}

#[tokio::test]
async fn update_relinks_services_when_ids_are_given() {
    let h = harness();
    for id in ["s1", "s2"] {
        h.directory
            .add_service(ServiceRef {
                id: id.into(),
                title: id.to_uppercase(),
                photo: String::new(),
            })
            .await;
    }
    let coach = h
        .service
        .create_coach(chunks(vec![CoachChunk::fields(CreateCoachFields {
            service_ids: vec!["s1".into()],
            ..create_fields("Alex")
        })]))
        .await
        .unwrap()
        .coach;

    let updated = h
        .service
        .update_coach(chunks(vec![CoachChunk::fields(UpdateCoachFields {
            service_ids: Some(vec!["s2".into()]),
            ..update_fields(coach.id, "")
        })]))
        .await
        .unwrap();

    let titles: Vec<_> = updated.services.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["S2"]);
    assert_eq!(h.directory.linked_services(&coach.id.to_string()).await, ["s2"]);
}

#[tokio::test]
async fn delete_removes_record_and_photo() {
    let h = harness();
    let coach = create_with_photo(&h, "Alex", b"png").await;
    let key = PhotoKeys::default().key_from_reference(&coach.photo).unwrap();

    let deleted = h.service.delete_coach(coach.id).await.unwrap();

    assert_eq!(deleted.id, coach.id);
    assert!(!h.blobs.exists(&key).await.unwrap());
    assert!(h.service.get_coach(coach.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn bucket_named_like_the_key_prefix_still_resolves_photo_keys() {
    let h = harness_with_bucket("coach");
    let coach = create_with_photo(&h, "Alex", b"old").await;
    let key = format!("coach/{}", coach.id);
    assert_eq!(coach.photo, format!("memory://coach/{key}"));

    let updated = h
        .service
        .update_coach(chunks(vec![
            CoachChunk::fields(update_fields(coach.id, "")),
            CoachChunk::photo(&b"new"[..]),
        ]))
        .await
        .unwrap()
        .coach;
    assert!(!h.blobs.exists(&key).await.unwrap());

    let new_key = PhotoKeys::default().key_from_reference(&updated.photo).unwrap();
    assert_eq!(h.blobs.get(&new_key).await.unwrap(), Bytes::from_static(b"new"));

    h.service.delete_coach(coach.id).await.unwrap();
    assert!(!h.blobs.exists(&new_key).await.unwrap());
    assert!(h.blobs.inner.is_empty().await);
}

#[tokio::test]
async fn delete_without_photo_makes_zero_blob_calls() {
    let h = harness();
    let coach = h
        .service
        .create_coach(chunks(vec![CoachChunk::fields(create_fields("Alex"))]))
        .await
        .unwrap()
        .coach;

    h.service.delete_coach(coach.id).await.unwrap();
    assert_eq!(h.blobs.inner.calls(), 0);
}

#[tokio::test]
async fn delete_with_unparseable_photo_is_malformed_reference() {
    let h = harness();
    let coach = Coach::new(
        Uuid::new_v4(),
        "Alex".into(),
        String::new(),
        "https://cdn.example.com/avatar.png".into(),
    );
    h.repository.create(coach.clone()).await.unwrap();

    let err = h.service.delete_coach(coach.id).await.unwrap_err();
    assert!(matches!(err, CoachError::MalformedReference { .. }));

    let err = h.service.delete_coach(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn aggregate_pairs_reviews_with_missing_users() {
    let h = harness();
    let alex = Coach::new(Uuid::new_v4(), "Alex".into(), String::new(), String::new());
    h.repository.create(alex.clone()).await.unwrap();
    h.directory
        .add_review(ReviewRef {
            id: "R1".into(),
            user_id: "U1".into(),
            coach_id: alex.id.to_string(),
            body: "great".into(),
            created_time: None,
            updated_time: None,
        })
        .await;

    let views = h.service.aggregator().aggregate_all().await.unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].coach, alex);
    assert!(views[0].services.is_empty());
    assert_eq!(views[0].reviews.len(), 1);
    assert_eq!(views[0].reviews[0].review.id, "R1");
    assert!(views[0].reviews[0].user.is_none());
}

#[tokio::test]
async fn aggregate_keeps_coaches_without_related_records() {
    let h = harness();
    let quiet = Coach::new(Uuid::new_v4(), "Quiet".into(), String::new(), String::new());
    let busy = Coach::new(Uuid::new_v4(), "Busy".into(), String::new(), String::new());
    h.repository.create(quiet.clone()).await.unwrap();
    h.repository.create(busy.clone()).await.unwrap();
    h.directory
        .add_service(ServiceRef {
            id: "s1".into(),
            title: "Boxing".into(),
            photo: String::new(),
        })
        .await;
    h.directory
        .link_coach_services(&busy.id.to_string(), &["s1".into()])
        .await
        .unwrap();
    h.directory
        .add_user(UserRef {
            id: "U1".into(),
            name: "Sam".into(),
            photo: String::new(),
        })
        .await;
    h.directory
        .add_review(ReviewRef {
            id: "R1".into(),
            user_id: "U1".into(),
            coach_id: busy.id.to_string(),
            body: String::new(),
            created_time: None,
            updated_time: None,
        })
        .await;

    let views = h.service.aggregator().aggregate_all().await.unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].coach.id, quiet.id);
    assert!(views[0].services.is_empty() && views[0].reviews.is_empty());
    assert_eq!(views[1].services[0].title, "Boxing");
    assert_eq!(views[1].reviews[0].user.as_ref().unwrap().name, "Sam");
}

#[tokio::test]
async fn aggregate_fails_when_a_bulk_call_fails() {
    let repository = Arc::new(MemoryCoachRepository::with_coaches(vec![Coach::new(
        Uuid::new_v4(),
        "Alex".into(),
        String::new(),
        String::new(),
    )]));
    let directory = Arc::new(MemoryDirectory::new());
    let aggregator = JoinAggregator::new(
        repository,
        directory.clone(),
        Arc::new(DownReviews),
        directory,
    );

    let err = aggregator.aggregate_all().await.unwrap_err();
    assert!(matches!(err, CoachError::RemoteCallFailed { call: "reviews.reviews_by_coach_ids", .. }));
}

#[tokio::test]
async fn aggregate_fails_when_user_lookup_fails() {
    let alex = Coach::new(Uuid::new_v4(), "Alex".into(), String::new(), String::new());
    let directory = Arc::new(MemoryDirectory::new());
    directory
        .add_review(ReviewRef {
            id: "R1".into(),
            user_id: "U1".into(),
            coach_id: alex.id.to_string(),
            body: String::new(),
            created_time: None,
            updated_time: None,
        })
        .await;
    let aggregator = JoinAggregator::new(
        Arc::new(MemoryCoachRepository::with_coaches(vec![alex])),
        directory.clone(),
        directory,
        Arc::new(DownUsers),
    );

    let err = aggregator.aggregate_all().await.unwrap_err();
    assert!(matches!(err, CoachError::RemoteCallFailed { call: "users.users_by_ids", .. }));
}

#[tokio::test]
async fn aggregate_of_no_coaches_skips_remote_calls() {
    let aggregator = JoinAggregator::new(
        Arc::new(MemoryCoachRepository::new()),
        Arc::new(MemoryDirectory::new()),
        Arc::new(DownReviews),
        Arc::new(MemoryDirectory::new()),
    );
    assert!(aggregator.aggregate_all().await.unwrap().is_empty());
}
