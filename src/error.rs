use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::datasource::DataSourceError;
use crate::domain::TaskType;

/// Failures of the claim flow.
///
/// The `Display` strings of the user-facing variants are part of the API
/// contract and are returned verbatim to clients.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("No active campaign has been found")]
    NoActiveCampaign,
    #[error("Weekly fragment for {task_type} for {week_date} already claimed")]
    AlreadyClaimed {
        task_type: TaskType,
        week_date: String,
    },
    #[error("No claimable fragments")]
    NoClaimableFragments,
    #[error("External source unavailable: {0}")]
    ExternalSourceUnavailable(#[from] DataSourceError),
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl ClaimError {
    /// Transient failures are worth retrying; claim rejections are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClaimError::ExternalSourceUnavailable(_))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ClaimError> for AppError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::InvalidSignature
            | ClaimError::NoActiveCampaign
            | ClaimError::AlreadyClaimed { .. }
            | ClaimError::NoClaimableFragments => AppError::BadRequest(err.to_string()),
            ClaimError::ExternalSourceUnavailable(_) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            ClaimError::DocumentNotFound(_) | ClaimError::Db(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_error_messages() {
        assert_eq!(
            ClaimError::NoActiveCampaign.to_string(),
            "No active campaign has been found"
        );
        assert_eq!(
            ClaimError::AlreadyClaimed {
                task_type: TaskType::LiquidityProvision,
                week_date: "2024-W03".to_string(),
            }
            .to_string(),
            "Weekly fragment for LIQUIDITY_PROVISION for 2024-W03 already claimed"
        );
        assert_eq!(
            ClaimError::NoClaimableFragments.to_string(),
            "No claimable fragments"
        );
    }

    #[test]
    fn test_only_external_failures_are_retryable() {
        assert!(ClaimError::ExternalSourceUnavailable(DataSourceError::RateLimited).is_retryable());
        assert!(!ClaimError::NoClaimableFragments.is_retryable());
        assert!(!ClaimError::InvalidSignature.is_retryable());
    }

    #[test]
    fn test_claim_error_status_mapping() {
        let resp = AppError::from(ClaimError::NoClaimableFragments).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::from(ClaimError::ExternalSourceUnavailable(
            DataSourceError::NetworkError("timeout".to_string()),
        ))
        .into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = AppError::from(ClaimError::DocumentNotFound("visit".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
