use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Coach, CoachResult};

/// Partial update of a coach row.
///
/// Empty strings leave the stored value untouched; `updated_time` is always
/// written.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCoachCommand {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub photo: String,
    pub updated_time: DateTime<Utc>,
}

impl UpdateCoachCommand {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            photo: String::new(),
            updated_time: Utc::now(),
        }
    }

    /// Columns this command overwrites, in a stable order.
    pub fn set_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::with_capacity(3);
        if !self.name.is_empty() {
            fields.push(("name", self.name.as_str()));
        }
        if !self.description.is_empty() {
            fields.push(("description", self.description.as_str()));
        }
        if !self.photo.is_empty() {
            fields.push(("photo", self.photo.as_str()));
        }
        fields
    }

    pub fn apply_to(&self, coach: &mut Coach) {
        for (field, value) in self.set_fields() {
            match field {
                "name" => coach.name = value.to_string(),
                "description" => coach.description = value.to_string(),
                "photo" => coach.photo = value.to_string(),
                _ => {}
            }
        }
        coach.updated_time = self.updated_time;
    }
}

/// Single-table coach persistence.
#[async_trait]
pub trait CoachRepository: Send + Sync {
    async fn create(&self, coach: Coach) -> CoachResult<Coach>;

    /// Fails with `CoachError::NotFound` when no row has this id.
    async fn get_by_id(&self, id: Uuid) -> CoachResult<Coach>;

    async fn update(&self, cmd: &UpdateCoachCommand) -> CoachResult<()>;

    async fn delete(&self, id: Uuid) -> CoachResult<()>;

    async fn list_all(&self) -> CoachResult<Vec<Coach>>;
}
