use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{core::gate::GateRejection, dao::mongodb::StoreError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StoreError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// A business-rule rejection with a stable reason code. These are
    /// expected user-facing outcomes, not system errors.
    #[error("rejected: {}", .0.message())]
    Rejected(GateRejection),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        ServiceError::Unavailable(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Business-rule rejection carrying its reason code.
    #[error("{}", .0.message())]
    Rejected(GateRejection),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Rejected(rejection) => AppError::Rejected(rejection),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Rejected(GateRejection::Unauthenticated) => StatusCode::UNAUTHORIZED,
            AppError::Rejected(GateRejection::MatchNotFound) => StatusCode::NOT_FOUND,
            AppError::Rejected(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let code = match &self {
            AppError::Rejected(rejection) => Some(rejection.code()),
            _ => None,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
            code,
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_map_onto_their_status_codes() {
        let cases = [
            (GateRejection::Unauthenticated, StatusCode::UNAUTHORIZED),
            (GateRejection::MatchNotFound, StatusCode::NOT_FOUND),
            (GateRejection::AlreadyUsed, StatusCode::CONFLICT),
            (GateRejection::NoPicks, StatusCode::CONFLICT),
            (GateRejection::NotSettled, StatusCode::CONFLICT),
            (GateRejection::NoLoss, StatusCode::CONFLICT),
        ];
        for (rejection, expected) in cases {
            let response = AppError::Rejected(rejection).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn unauthenticated_rejection_body_carries_its_code() {
        let response =
            AppError::Rejected(GateRejection::Unauthenticated).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "unauthenticated");
    }

    #[test]
    fn service_errors_convert_to_http_errors() {
        let app: AppError = ServiceError::Degraded.into();
        assert_eq!(
            app.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let app: AppError = ServiceError::NotFound("round 9".into()).into();
        assert_eq!(app.into_response().status(), StatusCode::NOT_FOUND);

        let app: AppError = ServiceError::InvalidInput("bad id".into()).into();
        assert_eq!(app.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
