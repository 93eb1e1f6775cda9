use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Coach, CoachError, CoachRepository, CoachResult, UpdateCoachCommand};

/// In-process coach table. Rows keep insertion order so `list_all` is stable.
#[derive(Default)]
pub struct MemoryCoachRepository {
    rows: RwLock<Vec<Coach>>,
}

impl MemoryCoachRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coaches(coaches: Vec<Coach>) -> Self {
        Self {
            rows: RwLock::new(coaches),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl CoachRepository for MemoryCoachRepository {
    async fn create(&self, coach: Coach) -> CoachResult<Coach> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|c| c.id == coach.id) {
            return Err(CoachError::remote(
                "coach_repository.create",
                format!("duplicate key {}", coach.id),
            ));
        }
        rows.push(coach.clone());
        Ok(coach)
    }

    async fn get_by_id(&self, id: Uuid) -> CoachResult<Coach> {
        self.rows
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| CoachError::not_found("Coach", id.to_string()))
    }

    async fn update(&self, cmd: &UpdateCoachCommand) -> CoachResult<()> {
        let mut rows = self.rows.write().await;
        // UPDATE ... WHERE id = ? touching zero rows is not an error
        if let Some(coach) = rows.iter_mut().find(|c| c.id == cmd.id) {
            cmd.apply_to(coach);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> CoachResult<()> {
        self.rows.write().await.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_all(&self) -> CoachResult<Vec<Coach>> {
        Ok(self.rows.read().await.clone())
    }
}
