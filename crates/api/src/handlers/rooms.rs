//! Handlers for the `/rooms` resource: authoring and public listings.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use escaperoom_core::authoring::{normalize_room, RoomDraft};
use escaperoom_core::error::CoreError;
use escaperoom_core::types::DbId;
use escaperoom_db::models::escape_room::{EscapeRoom, RoomDetail, RoomOverview, RoomSummary};
use escaperoom_db::repositories::EscapeRoomRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::narration::narrate_after_save;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on ids accepted by the "continue playing" listing.
const MAX_LISTED_IDS: usize = 100;

/// Query parameters for `GET /rooms`.
#[derive(Debug, Deserialize)]
pub struct RoomIdsQuery {
    /// Comma-separated room ids.
    pub ids: Option<String>,
}

/// Parse a comma-separated id list, skipping anything that is not an id.
fn parse_id_list(raw: &str) -> Vec<DbId> {
    let mut ids: Vec<DbId> = raw
        .split(',')
        .filter_map(|part| part.trim().parse::<DbId>().ok())
        .filter(|id| *id > 0)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids.truncate(MAX_LISTED_IDS);
    ids
}

fn room_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Escape room",
        id,
    })
}

/// Load a room and check the caller owns it.
async fn find_owned_room(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<EscapeRoom> {
    let room = EscapeRoomRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| room_not_found(id))?;
    user.ensure_owner(room.user_id, "escape room")?;
    Ok(room)
}

/// GET /api/v1/rooms?ids=1,2,3
///
/// Summaries for rooms a player has started. Unknown ids are skipped.
pub async fn list_by_ids(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RoomIdsQuery>,
) -> AppResult<Json<DataResponse<Vec<RoomSummary>>>> {
    let ids = query.ids.as_deref().map(parse_id_list).unwrap_or_default();
    let rooms = EscapeRoomRepo::list_summaries(&state.pool, &ids).await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// GET /api/v1/rooms/mine
pub async fn list_mine(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<EscapeRoom>>>> {
    let rooms = EscapeRoomRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: rooms }))
}

/// POST /api/v1/rooms
///
/// Create a room with its chapters and hints. Chapters flagged with
/// `generate_audio` get narration afterwards when the author is premium.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(draft): AppJson<RoomDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<RoomDetail>>)> {
    let room = normalize_room(&draft)?;

    let (created, chapters) = EscapeRoomRepo::create(&state.pool, user.user_id, &room).await?;
    narrate_after_save(&state, &user, &room, &chapters).await;

    let detail = EscapeRoomRepo::find_detail(&state.pool, created.id)
        .await?
        .ok_or_else(|| room_not_found(created.id))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/rooms/{id}
///
/// Public landing view. Answers are never included.
pub async fn overview(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<RoomOverview>>> {
    let overview = EscapeRoomRepo::find_overview(&state.pool, id)
        .await?
        .ok_or_else(|| room_not_found(id))?;
    Ok(Json(DataResponse { data: overview }))
}

/// GET /api/v1/rooms/{id}/edit
///
/// Full room with answers and hints, for the owner's edit form.
pub async fn edit_view(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<RoomDetail>>> {
    let detail = EscapeRoomRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| room_not_found(id))?;
    user.ensure_owner(detail.room.user_id, "escape room")?;
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/rooms/{id}
///
/// Replace the room's fields and reconcile its chapters and hints with the
/// submitted lists in one transaction.
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(draft): AppJson<RoomDraft>,
) -> AppResult<Json<DataResponse<RoomDetail>>> {
    let room = normalize_room(&draft)?;
    find_owned_room(&state, &user, id).await?;

    let (_, chapters) = EscapeRoomRepo::update(&state.pool, id, &room)
        .await?
        .ok_or_else(|| room_not_found(id))?;
    narrate_after_save(&state, &user, &room, &chapters).await;

    let detail = EscapeRoomRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| room_not_found(id))?;
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/rooms/{id}
///
/// Delete a room and, by cascade, its chapters and hints. Returns 204.
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    find_owned_room(&state, &user, id).await?;
    EscapeRoomRepo::delete(&state.pool, id).await?;
    tracing::info!(room_id = id, user_id = user.user_id, "Escape room deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_skips_garbage_and_duplicates() {
        assert_eq!(parse_id_list("3, 1,abc,,3,-2,0"), vec![1, 3]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn id_list_is_capped() {
        let raw = (1..=250).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        assert_eq!(parse_id_list(&raw).len(), MAX_LISTED_IDS);
    }
}
