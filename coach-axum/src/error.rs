use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use coach_core::{CoachError, Severity};

#[derive(Debug)]
pub struct CoachAxumError(pub CoachError);

impl From<CoachError> for CoachAxumError {
    fn from(e: CoachError) -> Self {
        Self(e)
    }
}

impl IntoResponse for CoachAxumError {
    fn into_response(self) -> Response {
        let err = self.0;
        match err.severity() {
            Severity::Critical => {
                tracing::error!(error = %err, "request left stores inconsistent")
            }
            Severity::Upstream => tracing::warn!(error = %err, "request failed downstream"),
            Severity::Client => tracing::debug!(error = %err, "request rejected"),
        }

        let status =
            StatusCode::from_u16(err.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(err.to_json())).into_response()
    }
}
