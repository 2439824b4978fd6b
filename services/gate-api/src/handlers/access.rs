//! Instance access handler

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use hookgate_auth_core::{find_cookie, DenyReason, IdentityCredentials, RequestCredentials};
use hookgate_types::InstanceId;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Header carrying the external provider's refresh token
const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

#[derive(Debug, Default, Deserialize)]
pub struct AccessQuery {
    /// Legacy link token
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub allowed: bool,
    pub instance_id: String,
    /// Fresh external credential the client should store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_credential: Option<String>,
}

/// GET /i/{instance_id}
///
/// Gate check for an instance page. Accepts a legacy link (`?token=`), the
/// instance's session cookie, or external identity tokens.
pub async fn access(
    State(state): State<AppState>,
    Path(instance_id): Path<String>,
    Query(query): Query<AccessQuery>,
    headers: HeaderMap,
) -> ApiResult<Json<AccessResponse>> {
    let instance_id = parse_instance_id(&instance_id)?;
    let cookie_name = state.gate.config().cookie_name(&instance_id);

    let credentials = RequestCredentials {
        query_token: query.token,
        session_cookie: session_cookie(&headers, &cookie_name),
        identity: identity_credentials(&headers),
    };

    let now = chrono::Utc::now().timestamp();
    let verdict = state.gate.authorize(&instance_id, &credentials, now).await?;

    if !verdict.allowed {
        let reason = verdict.reason.unwrap_or(DenyReason::PasswordRequired);
        return Err(ApiError::Denied(reason));
    }

    Ok(Json(AccessResponse {
        allowed: true,
        instance_id: instance_id.to_string(),
        refreshed_credential: verdict.refreshed_credential,
    }))
}

pub(crate) fn parse_instance_id(raw: &str) -> ApiResult<InstanceId> {
    InstanceId::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// First cookie named `name` across all `Cookie` headers
fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| find_cookie(value, name))
        .map(str::to_string)
}

fn identity_credentials(headers: &HeaderMap) -> IdentityCredentials {
    let id_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from);
    let refresh_token = headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|t| !t.is_empty())
        .map(String::from);

    IdentityCredentials {
        id_token,
        refresh_token,
    }
}
