//! JSON bodies exchanged with the remote directories, plus the grouping that
//! turns their list-shaped responses into maps keyed by owning id.

use coach_core::{ReviewRef, ReviewsByCoach, ServiceRef, ServicesByCoach, UserRef, UsersById};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CoachIdsRequest<'a> {
    pub coach_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CoachesIdsRequest<'a> {
    pub coaches_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceIdsRequest<'a> {
    pub service_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsersIdsRequest<'a> {
    pub users_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CoachServicesEntry {
    pub coach_id: String,
    #[serde(default)]
    pub service_objects: Vec<ServiceRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServicesByCoachIdsResponse {
    #[serde(default)]
    pub coach_ids_with_services: Vec<CoachServicesEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServicesResponse {
    #[serde(default)]
    pub service_objects: Vec<ServiceRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CoachServiceLink {
    #[serde(default)]
    pub coach_id: String,
    pub service_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinkResponse {
    #[serde(default)]
    pub coach_services: Vec<CoachServiceLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CoachReviewsEntry {
    pub coach_id: String,
    #[serde(default)]
    pub review_objects: Vec<ReviewRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewsByCoachIdsResponse {
    #[serde(default)]
    pub coach_id_with_review_object: Vec<CoachReviewsEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsersResponse {
    #[serde(default)]
    pub users_objects: Vec<UserRef>,
}

/// Entries repeating a coach id are appended in arrival order.
pub(crate) fn group_services(entries: Vec<CoachServicesEntry>) -> ServicesByCoach {
    let mut grouped = ServicesByCoach::new();
    for entry in entries {
        grouped
            .entry(entry.coach_id)
            .or_default()
            .extend(entry.service_objects);
    }
    grouped
}

pub(crate) fn group_reviews(entries: Vec<CoachReviewsEntry>) -> ReviewsByCoach {
    let mut grouped = ReviewsByCoach::new();
    for entry in entries {
        grouped
            .entry(entry.coach_id)
            .or_default()
            .extend(entry.review_objects);
    }
    grouped
}

/// Later duplicates of a user id replace earlier ones.
pub(crate) fn index_users(users: Vec<UserRef>) -> UsersById {
    users.into_iter().map(|u| (u.id.clone(), u)).collect()
}

/// Service ids linked to `coach_id`. Links echoed without an owner count as ours.
pub(crate) fn linked_service_ids(coach_id: &str, response: LinkResponse) -> Vec<String> {
    response
        .coach_services
        .into_iter()
        .filter(|link| link.coach_id.is_empty() || link.coach_id == coach_id)
        .map(|link| link.service_id)
        .collect()
}
