//! Profile of the signed-in user.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Account;
use crate::services::ProfileService;
use crate::state::AppState;

/// Show the signed-in account.
#[instrument(skip_all, fields(account_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Account>> {
    let account = ProfileService::new(state.identity(), state.stores())
        .resolve_current_user(&user)
        .await?;
    Ok(Json(account))
}
