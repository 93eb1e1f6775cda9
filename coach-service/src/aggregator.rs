//! Joins coaches with the services, reviews and reviewers owned by other
//! services.

use std::collections::HashSet;
use std::sync::Arc;

use coach_core::{
    AggregatedCoachView, Coach, CoachRepository, CoachResult, ReviewDirectory, ReviewWithUser,
    ReviewsByCoach, ServiceDirectory, ServiceRef, ServicesByCoach, UserDirectory, UsersById,
};

/// How a single-coach write treats existing service links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Add links for a coach that has none yet.
    Link,
    /// Replace whatever the coach is linked to.
    Relink,
}

#[derive(Clone)]
pub struct JoinAggregator {
    repository: Arc<dyn CoachRepository>,
    services: Arc<dyn ServiceDirectory>,
    reviews: Arc<dyn ReviewDirectory>,
    users: Arc<dyn UserDirectory>,
}

impl JoinAggregator {
    pub fn new(
        repository: Arc<dyn CoachRepository>,
        services: Arc<dyn ServiceDirectory>,
        reviews: Arc<dyn ReviewDirectory>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            repository,
            services,
            reviews,
            users,
        }
    }

    /// Every coach with its services and reviews, each review paired with its
    /// author.
    ///
    /// Any failing bulk call fails the whole result. Records a remote service
    /// simply does not have show up as empty lists or `None` users.
    pub async fn aggregate_all(&self) -> CoachResult<Vec<AggregatedCoachView>> {
        let coaches = self.repository.list_all().await?;
        if coaches.is_empty() {
            return Ok(Vec::new());
        }

        let coach_ids = ordered_unique(coaches.iter().map(|c| c.id.to_string()));
        let (services, reviews) = futures::try_join!(
            self.services.services_by_coach_ids(&coach_ids),
            self.reviews.reviews_by_coach_ids(&coach_ids),
        )?;

        let user_ids = ordered_unique(
            coach_ids
                .iter()
                .filter_map(|id| reviews.get(id))
                .flatten()
                .map(|review| review.user_id.clone()),
        );
        let users = if user_ids.is_empty() {
            UsersById::new()
        } else {
            self.users.users_by_ids(&user_ids).await?
        };

        tracing::debug!(
            coaches = coaches.len(),
            reviewers = user_ids.len(),
            "aggregated coaches"
        );
        Ok(merge(coaches, &services, &reviews, &users))
    }

    /// Link `coach` to `service_ids` and echo the services it ends up with.
    ///
    /// Nothing is called for an empty id list, and the echo read is skipped
    /// when the directory linked nothing.
    pub async fn attach_services(
        &self,
        coach: &Coach,
        service_ids: &[String],
        mode: LinkMode,
    ) -> CoachResult<Vec<ServiceRef>> {
        if service_ids.is_empty() {
            return Ok(Vec::new());
        }

        let coach_id = coach.id.to_string();
        let linked = match mode {
            LinkMode::Link => {
                self.services
                    .link_coach_services(&coach_id, service_ids)
                    .await?
            }
            LinkMode::Relink => {
                self.services
                    .relink_coach_services(&coach_id, service_ids)
                    .await?
            }
        };
        if linked.is_empty() {
            return Ok(Vec::new());
        }

        self.services.services_by_coach_id(&coach_id).await
    }
}

fn ordered_unique<I: IntoIterator<Item = String>>(ids: I) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Pure merge step of [`JoinAggregator::aggregate_all`]; preserves coach order.
pub fn merge(
    coaches: Vec<Coach>,
    services: &ServicesByCoach,
    reviews: &ReviewsByCoach,
    users: &UsersById,
) -> Vec<AggregatedCoachView> {
    coaches
        .into_iter()
        .map(|coach| {
            let id = coach.id.to_string();
            let coach_services = services.get(&id).cloned().unwrap_or_default();
            let coach_reviews = reviews
                .get(&id)
                .map(|list| {
                    list.iter()
                        .map(|review| ReviewWithUser {
                            review: review.clone(),
                            user: users.get(&review.user_id).cloned(),
                        })
                        .collect()
                })
                .unwrap_or_default();

            AggregatedCoachView {
                coach,
                services: coach_services,
                reviews: coach_reviews,
            }
        })
        .collect()
}
