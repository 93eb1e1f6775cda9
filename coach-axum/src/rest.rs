use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    routing, Json, Router,
};
use coach_core::{
    AggregatedCoachView, Coach, CoachError, CoachWithServices, CreateCoachFields,
    UpdateCoachFields,
};
use uuid::Uuid;

use crate::multipart::{chunk_stream, map_multipart_rejection};
use crate::{CoachAxumError, CoachAxumState};

fn parse_id(id: &str) -> Result<Uuid, CoachAxumError> {
    Uuid::parse_str(id)
        .map_err(|_| CoachError::bad_request(format!("`{id}` is not a valid coach id")).into())
}

async fn find(State(state): State<CoachAxumState>) -> Result<Json<Vec<Coach>>, CoachAxumError> {
    Ok(Json(state.api.find().await?))
}

async fn find_aggregated(
    State(state): State<CoachAxumState>,
) -> Result<Json<Vec<AggregatedCoachView>>, CoachAxumError> {
    Ok(Json(state.api.find_aggregated().await?))
}

async fn create(
    State(state): State<CoachAxumState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CoachWithServices>, CoachAxumError> {
    let multipart = multipart.map_err(map_multipart_rejection)?;
    let res = state
        .api
        .create(chunk_stream::<CreateCoachFields>(multipart))
        .await?;
    Ok(Json(res))
}

async fn update(
    State(state): State<CoachAxumState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CoachWithServices>, CoachAxumError> {
    let multipart = multipart.map_err(map_multipart_rejection)?;
    let res = state
        .api
        .update(chunk_stream::<UpdateCoachFields>(multipart))
        .await?;
    Ok(Json(res))
}

async fn get(
    State(state): State<CoachAxumState>,
    Path(id): Path<String>,
) -> Result<Json<Coach>, CoachAxumError> {
    let id = parse_id(&id)?;
    Ok(Json(state.api.get(id).await?))
}

async fn remove(
    State(state): State<CoachAxumState>,
    Path(id): Path<String>,
) -> Result<Json<Coach>, CoachAxumError> {
    let id = parse_id(&id)?;
    Ok(Json(state.api.remove(id).await?))
}

/// Routes for the coach resource, relative to where the router is nested.
pub fn coach_router(state: CoachAxumState) -> Router<()> {
    Router::new()
        .route("/", routing::get(find).post(create).put(update))
        .route("/aggregated", routing::get(find_aggregated))
        .route("/{id}", routing::get(get).delete(remove))
        .with_state(state)
}
