//! Password login handler

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use hookgate_auth_core::PasswordExchange;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::handlers::access::parse_instance_id;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub instance_id: String,
    pub expires_in: u64,
}

/// POST /i/{instance_id}/login
///
/// Exchange the instance password for a session cookie
pub async fn login(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let instance_id = parse_instance_id(&instance_id)?;

    let header_pairs: Vec<(&str, &str)> = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
        .collect();

    let now = chrono::Utc::now().timestamp();
    let exchange = state
        .gate
        .exchange_password(&instance_id, &req.password, header_pairs, now)
        .await?;

    match exchange {
        PasswordExchange::Granted(cookie) => {
            let response = LoginResponse {
                instance_id: instance_id.to_string(),
                expires_in: cookie.max_age,
            };
            Ok((
                StatusCode::OK,
                [(header::SET_COOKIE, cookie.to_header_value())],
                Json(response),
            ))
        }
        PasswordExchange::Rejected(rejection) => Err(ApiError::Rejected(rejection)),
    }
}
