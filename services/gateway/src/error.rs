use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::{AssetError, CategoryError, LedgerError, TenantError};

/// Central error type for the gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status and stable error code for the JSON envelope.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::RateLimitExceeded(_) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED")
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Internal details stay in the logs, not the response body.
        let message = match &self {
            AppError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}

/// Domain errors map onto HTTP statuses here, in one place.
///
/// A tenant that was never registered reads as 404 rather than 403 so
/// requests with a foreign or mistyped tenant id leak nothing about
/// what exists.
impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Asset(e) => match e {
                AssetError::NotFound { .. } => AppError::NotFound(e.to_string()),
                AssetError::AlreadyArchived { .. } | AssetError::NotArchived { .. } => {
                    AppError::Conflict(e.to_string())
                }
                AssetError::InvalidName(_) => AppError::BadRequest(e.to_string()),
            },
            LedgerError::Category(e) => match e {
                CategoryError::NotFound { .. } => AppError::NotFound(e.to_string()),
                CategoryError::InvalidName(_) => AppError::BadRequest(e.to_string()),
            },
            LedgerError::Tenant(e) => match e {
                TenantError::NotRegistered { .. } => AppError::NotFound(e.to_string()),
                TenantError::AlreadyRegistered { .. } => AppError::Conflict(e.to_string()),
            },
            LedgerError::System { message } => AppError::Internal(anyhow::anyhow!(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_not_found_maps_to_404() {
        let err: AppError = LedgerError::from(AssetError::NotFound {
            asset_id: "a-1".to_string(),
        })
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_archive_conflicts_map_to_409() {
        let archived: AppError = LedgerError::from(AssetError::AlreadyArchived {
            asset_id: "a-1".to_string(),
        })
        .into();
        assert_eq!(archived.status_and_code().0, StatusCode::CONFLICT);

        let not_archived: AppError = LedgerError::from(AssetError::NotArchived {
            asset_id: "a-1".to_string(),
        })
        .into();
        assert_eq!(not_archived.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        let err: AppError =
            LedgerError::from(AssetError::InvalidName("empty".to_string())).into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unregistered_tenant_maps_to_404() {
        let err: AppError = LedgerError::from(TenantError::NotRegistered {
            tenant_id: "t-1".to_string(),
        })
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_double_registration_maps_to_409() {
        let err: AppError = LedgerError::from(TenantError::AlreadyRegistered {
            tenant_id: "t-1".to_string(),
        })
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn test_system_error_maps_to_500() {
        let err: AppError = LedgerError::System {
            message: "journal append failed".to_string(),
        }
        .into();
        assert_eq!(
            err.status_and_code().0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
