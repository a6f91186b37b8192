//! Route definitions for the `/rooms` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{play, rooms};
use crate::state::AppState;

/// Routes mounted at `/rooms`.
///
/// ```text
/// GET    /                                  -> list_by_ids
/// POST   /                                  -> create
/// GET    /mine                              -> list_mine
/// GET    /{id}                              -> overview
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
/// GET    /{id}/edit                         -> edit_view
/// POST   /{id}/validate-progress            -> validate_progress
/// GET    /{id}/chapters/{n}                 -> chapter_page
/// POST   /{id}/chapters/{n}/answer          -> check_answer
/// POST   /{id}/chapters/{n}/validate-access -> validate_access
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rooms::list_by_ids).post(rooms::create))
        .route("/mine", get(rooms::list_mine))
        .route(
            "/{id}",
            get(rooms::overview).put(rooms::update).delete(rooms::delete),
        )
        .route("/{id}/edit", get(rooms::edit_view))
        .route("/{id}/validate-progress", post(play::validate_progress))
        .route("/{id}/chapters/{n}", get(play::chapter_page))
        .route("/{id}/chapters/{n}/answer", post(play::check_answer))
        .route(
            "/{id}/chapters/{n}/validate-access",
            post(play::validate_access),
        )
}
