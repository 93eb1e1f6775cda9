use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A coach as stored in the relational store.
///
/// `photo` is either empty or the location of a blob written by the coach
/// service; it never owns the blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub photo: String,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl Coach {
    pub fn new(id: Uuid, name: String, description: String, photo: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description,
            photo,
            created_time: now,
            updated_time: now,
        }
    }

    pub fn has_photo(&self) -> bool {
        !self.photo.is_empty()
    }
}

/// The structured part of a streamed create/update request.
pub trait StructuredPayload {
    /// An empty payload is treated as if the chunk carried none.
    fn is_empty(&self) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoachFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Services the new coach should be linked to.
    #[serde(default)]
    pub service_ids: Vec<String>,
}

impl StructuredPayload for CreateCoachFields {
    fn is_empty(&self) -> bool {
        self.name.is_empty() && self.description.is_empty() && self.service_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoachFields {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `None` leaves links untouched, `Some` replaces them.
    #[serde(default)]
    pub service_ids: Option<Vec<String>>,
}

impl StructuredPayload for UpdateCoachFields {
    fn is_empty(&self) -> bool {
        self.id.is_nil()
            && self.name.is_empty()
            && self.description.is_empty()
            && self.service_ids.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub photo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRef {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub coach_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photo: String,
}

/// A review paired with its author. `user` is `None` when the user service
/// did not return the author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithUser {
    pub review: ReviewRef,
    pub user: Option<UserRef>,
}

/// One coach joined with everything other services know about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedCoachView {
    pub coach: Coach,
    pub services: Vec<ServiceRef>,
    pub reviews: Vec<ReviewWithUser>,
}

/// Response of the streaming create/update operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachWithServices {
    pub coach: Coach,
    pub services: Vec<ServiceRef>,
}
