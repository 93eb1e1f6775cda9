use std::collections::HashMap;

use async_trait::async_trait;
use coach_core::{
    CoachResult, ReviewDirectory, ReviewRef, ReviewsByCoach, ServiceDirectory, ServiceRef,
    ServicesByCoach, UserDirectory, UserRef, UsersById,
};
use tokio::sync::RwLock;

/// In-process stand-in for the services, reviews and users directories.
///
/// Linking only records ids of services that were seeded with
/// [`MemoryDirectory::add_service`]; unknown ids are dropped, the way the
/// services directory ignores ids it does not own.
#[derive(Default)]
pub struct MemoryDirectory {
    services: RwLock<HashMap<String, ServiceRef>>,
    links: RwLock<HashMap<String, Vec<String>>>,
    reviews: RwLock<Vec<ReviewRef>>,
    users: RwLock<HashMap<String, UserRef>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_service(&self, service: ServiceRef) {
        self.services
            .write()
            .await
            .insert(service.id.clone(), service);
    }

    pub async fn add_review(&self, review: ReviewRef) {
        self.reviews.write().await.push(review);
    }

    pub async fn add_user(&self, user: UserRef) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    /// Service ids currently linked to `coach_id`.
    pub async fn linked_services(&self, coach_id: &str) -> Vec<String> {
        self.links
            .read()
            .await
            .get(coach_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn known_ids(&self, service_ids: &[String]) -> Vec<String> {
        let services = self.services.read().await;
        let mut ids: Vec<String> = Vec::new();
        for id in service_ids {
            if services.contains_key(id) && !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    async fn resolve(&self, service_ids: &[String]) -> Vec<ServiceRef> {
        let services = self.services.read().await;
        service_ids
            .iter()
            .filter_map(|id| services.get(id).cloned())
            .collect()
    }
}

#[async_trait]
impl ServiceDirectory for MemoryDirectory {
    async fn services_by_coach_ids(&self, coach_ids: &[String]) -> CoachResult<ServicesByCoach> {
        let links = self.links.read().await.clone();
        let mut grouped = ServicesByCoach::new();
        for coach_id in coach_ids {
            if let Some(ids) = links.get(coach_id) {
                grouped.insert(coach_id.clone(), self.resolve(ids).await);
            }
        }
        Ok(grouped)
    }

    async fn services_by_coach_id(&self, coach_id: &str) -> CoachResult<Vec<ServiceRef>> {
        let ids = self.linked_services(coach_id).await;
        Ok(self.resolve(&ids).await)
    }

    async fn link_coach_services(
        &self,
        coach_id: &str,
        service_ids: &[String],
    ) -> CoachResult<Vec<String>> {
        let ids = self.known_ids(service_ids).await;
        let mut links = self.links.write().await;
        let linked = links.entry(coach_id.to_string()).or_default();
        for id in &ids {
            if !linked.contains(id) {
                linked.push(id.clone());
            }
        }
        Ok(ids)
    }

    async fn relink_coach_services(
        &self,
        coach_id: &str,
        service_ids: &[String],
    ) -> CoachResult<Vec<String>> {
        let ids = self.known_ids(service_ids).await;
        self.links
            .write()
            .await
            .insert(coach_id.to_string(), ids.clone());
        Ok(ids)
    }
}

#[async_trait]
impl ReviewDirectory for MemoryDirectory {
    async fn reviews_by_coach_ids(&self, coach_ids: &[String]) -> CoachResult<ReviewsByCoach> {
        let mut grouped = ReviewsByCoach::new();
        for review in self.reviews.read().await.iter() {
            if coach_ids.contains(&review.coach_id) {
                grouped
                    .entry(review.coach_id.clone())
                    .or_default()
                    .push(review.clone());
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn users_by_ids(&self, user_ids: &[String]) -> CoachResult<UsersById> {
        let users = self.users.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (id.clone(), u.clone())))
            .collect())
    }
}
