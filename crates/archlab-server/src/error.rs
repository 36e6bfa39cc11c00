use archlab_core::StoreError;
use archlab_design::{EngineError, PipelineError};
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Errors surfaced to HTTP clients as `{message, details?}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String, details: Option<Value> },

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("storage error: {0}")]
    Storage(StoreError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn invalid_body(details: impl Into<String>) -> Self {
        Self::BadRequest {
            message: "Invalid body".to_string(),
            details: Some(Value::String(details.into())),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(PipelineError::Model(EngineError::RateLimited(_))) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Pipeline(PipelineError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Pipeline(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::BadRequest { details, .. } => details.clone(),
            ApiError::Pipeline(PipelineError::Schema(errors)) => Some(json!(errors)),
            ApiError::Pipeline(PipelineError::Malformed { raw, extracted, .. }) => {
                Some(json!({ "raw": raw, "extracted": extracted }))
            }
            _ => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProjectNotFound(_) => ApiError::NotFound("Project not found"),
            StoreError::VersionNotFound(_) => ApiError::NotFound("Version not found"),
            StoreError::Stale(_) => {
                ApiError::Conflict("Version changed while the design was being produced; retry")
            }
            other => ApiError::Storage(other),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest {
            message: "Invalid path parameter".to_string(),
            details: Some(Value::String(rejection.body_text())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let mut body = json!({ "message": self.to_string() });
        if let Some(details) = self.details() {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlab_design::FieldError;
    use uuid::Uuid;

    #[test]
    fn maps_store_errors_to_not_found() {
        let err: ApiError = StoreError::VersionNotFound(Uuid::new_v4()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Version not found");
    }

    #[test]
    fn stale_version_is_a_conflict() {
        let err: ApiError = StoreError::Stale(Uuid::new_v4()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let err = ApiError::from(PipelineError::Model(EngineError::RateLimited("quota".into())));
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        let err = ApiError::from(PipelineError::Model(EngineError::EmptyResponse));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn schema_errors_become_details() {
        let err = ApiError::from(PipelineError::Schema(vec![FieldError {
            path: "diagrams".into(),
            message: "is required".into(),
        }]));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.details(), Some(json!([{"path": "diagrams", "message": "is required"}])));
    }
}
