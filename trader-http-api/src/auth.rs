use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::TraderApiState;

pub async fn auth_middleware(
    State(state): State<Arc<TraderApiState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Skip auth for health check
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.len() > 7 && header.starts_with("Bearer ") => &header[7..],
        Some(header) => header,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    if token == state.api_token {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}
