use std::time::Duration;

use async_trait::async_trait;
use coach_core::{
    CoachError, CoachResult, ReviewDirectory, ReviewsByCoach, ServiceDirectory, ServiceRef,
    ServicesByCoach, UserDirectory, UsersById,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::wire::{
    self, CoachIdsRequest, CoachesIdsRequest, LinkResponse, ReviewsByCoachIdsResponse,
    ServiceIdsRequest, ServicesByCoachIdsResponse, ServicesResponse, UsersIdsRequest,
    UsersResponse,
};

/// Base URL + shared `reqwest` client for one remote service.
#[derive(Clone, Debug)]
pub struct RemoteEndpoint {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl RemoteEndpoint {
    pub fn new<S: Into<String>>(client: Client, base_url: S, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
    }

    /// Send `request` and decode a JSON body. Transport failures, non-2xx
    /// statuses and undecodable bodies all become `RemoteCallFailed`.
    async fn call<R: DeserializeOwned>(
        &self,
        call: &'static str,
        request: RequestBuilder,
    ) -> CoachResult<R> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(call, base_url = %self.base_url, error = %e, "remote request failed");
            CoachError::remote(call, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(call, base_url = %self.base_url, %status, "remote service returned an error");
            return Err(CoachError::remote(call, format!("status {status}")));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CoachError::remote(call, format!("invalid response body: {e}")))
    }
}

pub struct HttpServiceDirectory {
    endpoint: RemoteEndpoint,
}

impl HttpServiceDirectory {
    pub fn new(endpoint: RemoteEndpoint) -> Self {
        Self { endpoint }
    }

    async fn write_links(
        &self,
        call: &'static str,
        method: Method,
        coach_id: &str,
        service_ids: &[String],
    ) -> CoachResult<Vec<String>> {
        let request = self
            .endpoint
            .request(method, &format!("/coaches/{coach_id}/services"))
            .json(&ServiceIdsRequest { service_ids });
        let response: LinkResponse = self.endpoint.call(call, request).await?;
        Ok(wire::linked_service_ids(coach_id, response))
    }
}

#[async_trait]
impl ServiceDirectory for HttpServiceDirectory {
    async fn services_by_coach_ids(&self, coach_ids: &[String]) -> CoachResult<ServicesByCoach> {
        let request = self
            .endpoint
            .request(Method::POST, "/coaches/services")
            .json(&CoachIdsRequest { coach_ids });
        let response: ServicesByCoachIdsResponse = self
            .endpoint
            .call("services.services_by_coach_ids", request)
            .await?;
        Ok(wire::group_services(response.coach_ids_with_services))
    }

    async fn services_by_coach_id(&self, coach_id: &str) -> CoachResult<Vec<ServiceRef>> {
        let request = self
            .endpoint
            .request(Method::GET, &format!("/coaches/{coach_id}/services"));
        let response: ServicesResponse = self
            .endpoint
            .call("services.services_by_coach_id", request)
            .await?;
        Ok(response.service_objects)
    }

    async fn link_coach_services(
        &self,
        coach_id: &str,
        service_ids: &[String],
    ) -> CoachResult<Vec<String>> {
        self.write_links("services.link_coach_services", Method::POST, coach_id, service_ids)
            .await
    }

    async fn relink_coach_services(
        &self,
        coach_id: &str,
        service_ids: &[String],
    ) -> CoachResult<Vec<String>> {
        self.write_links("services.relink_coach_services", Method::PUT, coach_id, service_ids)
            .await
    }
}

pub struct HttpReviewDirectory {
    endpoint: RemoteEndpoint,
}

impl HttpReviewDirectory {
    pub fn new(endpoint: RemoteEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl ReviewDirectory for HttpReviewDirectory {
    async fn reviews_by_coach_ids(&self, coach_ids: &[String]) -> CoachResult<ReviewsByCoach> {
        let request = self
            .endpoint
            .request(Method::POST, "/coaches/reviews")
            .json(&CoachesIdsRequest {
                coaches_ids: coach_ids,
            });
        let response: ReviewsByCoachIdsResponse = self
            .endpoint
            .call("reviews.reviews_by_coach_ids", request)
            .await?;
        Ok(wire::group_reviews(response.coach_id_with_review_object))
    }
}

pub struct HttpUserDirectory {
    endpoint: RemoteEndpoint,
}

impl HttpUserDirectory {
    pub fn new(endpoint: RemoteEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn users_by_ids(&self, user_ids: &[String]) -> CoachResult<UsersById> {
        let request = self
            .endpoint
            .request(Method::POST, "/users/batch")
            .json(&UsersIdsRequest {
                users_ids: user_ids,
            });
        let response: UsersResponse = self.endpoint.call("users.users_by_ids", request).await?;
        Ok(wire::index_users(response.users_objects))
    }
}
