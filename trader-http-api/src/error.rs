//! HTTP mapping for contract and client errors.
//!
//! A domain rejection by the contract is a well-formed answer about state,
//! not a server fault: it maps to 409 with the stable error name so the
//! frontend can match on it. Client-side failures split into caller
//! mistakes (400), wallet refusal (403), and chain trouble (502).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use trader_runtime::{ContractError, TraderError};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Contract(ContractError),
    Client(TraderError),
}

impl From<ContractError> for ApiError {
    fn from(err: ContractError) -> Self {
        ApiError::Contract(err)
    }
}

impl From<TraderError> for ApiError {
    fn from(err: TraderError) -> Self {
        ApiError::Client(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "BadRequest".to_string(), message)
            }
            ApiError::Contract(err) => (
                StatusCode::CONFLICT,
                err.name().to_string(),
                err.to_string(),
            ),
            ApiError::Client(err) => {
                let status = match &err {
                    TraderError::Encode(_) | TraderError::Config(_) => StatusCode::BAD_REQUEST,
                    TraderError::SigningRejected(_) => StatusCode::FORBIDDEN,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, "ClientError".to_string(), err.to_string())
            }
        };
        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Flatten a dry-run result: client failures and domain rejections both
/// become API errors, leaving the contract's answer.
pub fn call_ok<T>(result: Result<trader_runtime::CallResult<T>, TraderError>) -> Result<T, ApiError> {
    Ok(result??)
}
