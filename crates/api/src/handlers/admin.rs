//! Admin-only user management.

use axum::extract::State;
use axum::Json;
use escaperoom_core::error::CoreError;
use escaperoom_core::types::DbId;
use escaperoom_db::models::user::UserResponse;
use escaperoom_db::repositories::UserRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/premium`.
#[derive(Debug, Deserialize)]
pub struct SetPremiumRequest {
    pub premium: bool,
}

/// PUT /api/v1/admin/users/{id}/premium
///
/// Grant or revoke the premium entitlement. Premium-gated routes see the
/// change on the user's next request.
pub async fn set_premium(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(user_id): AppPath<DbId>,
    AppJson(input): AppJson<SetPremiumRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::set_premium(&state.pool, user_id, input.premium)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user_id,
        })?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id,
        premium = input.premium,
        "Premium entitlement updated",
    );
    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}
