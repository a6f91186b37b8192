//! Route definitions for `/generate`.

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/generate`. All require the premium entitlement.
///
/// ```text
/// POST /audio       -> generate_audio
/// POST /escape-room -> generate_escape_room
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/audio", post(generation::generate_audio))
        .route("/escape-room", post(generation::generate_escape_room))
}
