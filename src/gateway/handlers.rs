//! HTTP handlers
//!
//! Thin adapters: parse the request, call into the session store or the
//! transfer engine, render the result.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};

use super::state::AppState;
use super::types::{ApiError, ApiResult, created, ok};
use crate::account::{AccountRepository, Cpf};
use crate::core_types::{AccountId, Token};
use crate::error::LedgerError;
use crate::transfer::{Transfer, TransferRequest};

pub const WELCOME_MESSAGE: &str = "Welcome to the funds ledger API\n";

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub cpf: String,
    pub secret: String,
}

/// Login response data
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: Token,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub timestamp_ms: u64,
}

/// GET /
pub async fn welcome() -> &'static str {
    WELCOME_MESSAGE
}

/// GET /health
///
/// Pings the database; never exposes why it is unhealthy.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<HealthResponse> {
    if let Err(e) = state.db.health_check().await {
        tracing::warn!(error = %e, "Health check failed");
        return ApiError::service_unavailable("unavailable").into_err();
    }

    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    ok(HealthResponse { timestamp_ms })
}

/// POST /login
///
/// Checks the cpf format before touching the database, then compares the
/// secret hash and opens a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(req) = payload.map_err(invalid_body)?;

    let cpf = Cpf::new(&req.cpf)?;
    let credentials = AccountRepository::find_credentials(state.db.pool(), &cpf)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Credential lookup failed");
            LedgerError::from(e)
        })?
        .ok_or(LedgerError::UnknownAccount)?;

    if !credentials.verify(&req.secret) {
        tracing::debug!(account_id = credentials.id, "Login rejected: wrong secret");
        return Err(LedgerError::WrongSecret.into());
    }

    let token = state.sessions.issue(credentials.id)?;
    tracing::info!(account_id = credentials.id, "Session opened");

    created(LoginResponse { token })
}

/// POST /transfers
///
/// The origin account is whoever owns the session token.
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult<Transfer> {
    let origin_id = authenticate(&state, &headers)?;
    let Json(req) = payload.map_err(invalid_body)?;

    let transfer = state
        .engine
        .transfer(origin_id, req.destination_id, req.amount)
        .await?;

    created(transfer)
}

/// Malformed or mistyped JSON body
fn invalid_body(rejection: JsonRejection) -> ApiError {
    LedgerError::InvalidRequest(rejection.body_text()).into()
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AccountId, ApiError> {
    let token = session_token(headers).ok_or_else(ApiError::missing_auth)?;
    Ok(state.sessions.resolve(token)?)
}

/// Token from the Authorization header, with or without a `Bearer ` prefix
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .trim_start()
        .strip_prefix("Bearer")
        .map(str::trim_start)
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then_some(token)
}
