use crate::utils::error::{ErrorCategory, SanctuaryError};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError(pub SanctuaryError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.category() {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SanctuaryError> for ApiError {
    fn from(err: SanctuaryError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SanctuaryError::validation("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(SanctuaryError::validation("query", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(SanctuaryError::validation("id", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.0);
            "An unexpected error occurred".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorBody {
            timestamp: chrono::Utc::now().to_rfc3339(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::EntityKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SanctuaryError::not_found(EntityKind::Animal, 1), StatusCode::NOT_FOUND),
            (SanctuaryError::CaretakerRequired, StatusCode::BAD_REQUEST),
            (
                SanctuaryError::HabitatCapacityExceeded {
                    habitat_id: 1,
                    name: "Savana".to_string(),
                    capacity: 1,
                    occupants: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                SanctuaryError::DuplicateContact {
                    contact: "ana@zoo.example".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                SanctuaryError::InUseConflict {
                    entity: EntityKind::Keeper,
                    id: 1,
                    references: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                SanctuaryError::Storage {
                    message: "lock poisoned".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
