//! User administration handlers. Every route requires `SuperAdmin`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use product_catalog_core::AccountId;

use crate::error::{AppError, Result};
use crate::middleware::RequireSuperAdmin;
use crate::models::{AddUserForm, RoleOption, UpdateUserForm, UserEditView, UserView};
use crate::services::AdminService;
use crate::state::AppState;

/// List every account with its role.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
) -> Result<Json<Vec<UserView>>> {
    let users = AdminService::new(state.identity(), state.stores())
        .list_users()
        .await?;
    Ok(Json(users))
}

/// Roles that can be chosen for a new account.
#[instrument(skip_all)]
pub async fn new_user(RequireSuperAdmin(_admin): RequireSuperAdmin) -> Json<Vec<RoleOption>> {
    Json(AdminService::list_role_options())
}

/// Create an account.
///
/// Policy and duplicate rejections come back as form-level errors.
#[instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Json(form): Json<AddUserForm>,
) -> Result<impl IntoResponse> {
    let account = AdminService::new(state.identity(), state.stores())
        .create_user(&form)
        .await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Load an account for editing.
#[instrument(skip_all, fields(account_id = %id))]
pub async fn edit(
    State(state): State<AppState>,
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    Path(id): Path<AccountId>,
) -> Result<Json<UserEditView>> {
    let view = AdminService::new(state.identity(), state.stores())
        .get_user_for_edit(id)
        .await?;
    Ok(Json(view))
}

/// Update an account's names and role.
#[instrument(skip_all, fields(account_id = %id, admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(id): Path<AccountId>,
    Json(form): Json<UpdateUserForm>,
) -> Result<Json<UserEditView>> {
    let service = AdminService::new(state.identity(), state.stores());
    if !service.update_user_from_form(id, &form).await? {
        return Err(AppError::NotFound(format!("user {id}")));
    }
    Ok(Json(service.get_user_for_edit(id).await?))
}

/// Remove an account's profile.
#[instrument(skip_all, fields(account_id = %id, admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    Path(id): Path<AccountId>,
) -> Result<StatusCode> {
    let deleted = AdminService::new(state.identity(), state.stores())
        .delete_user(id)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("user {id}")))
    }
}
