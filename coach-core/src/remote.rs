//! Capabilities of the three services that own data joined onto a coach.
//!
//! Bulk fetches return a mapping grouped by owning id. A missing key means
//! "no records for that id"; a failed call is an `Err`. The two must never be
//! confused by callers.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{CoachResult, ReviewRef, ServiceRef, UserRef};

pub type ServicesByCoach = HashMap<String, Vec<ServiceRef>>;
pub type ReviewsByCoach = HashMap<String, Vec<ReviewRef>>;
pub type UsersById = HashMap<String, UserRef>;

#[async_trait]
pub trait ServiceDirectory: Send + Sync {
    async fn services_by_coach_ids(&self, coach_ids: &[String]) -> CoachResult<ServicesByCoach>;

    async fn services_by_coach_id(&self, coach_id: &str) -> CoachResult<Vec<ServiceRef>>;

    /// Associate a new coach with services. Returns the ids actually linked.
    async fn link_coach_services(
        &self,
        coach_id: &str,
        service_ids: &[String],
    ) -> CoachResult<Vec<String>>;

    /// Replace the services of an existing coach. Returns the ids now linked.
    async fn relink_coach_services(
        &self,
        coach_id: &str,
        service_ids: &[String],
    ) -> CoachResult<Vec<String>>;
}

#[async_trait]
pub trait ReviewDirectory: Send + Sync {
    async fn reviews_by_coach_ids(&self, coach_ids: &[String]) -> CoachResult<ReviewsByCoach>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn users_by_ids(&self, user_ids: &[String]) -> CoachResult<UsersById>;
}
