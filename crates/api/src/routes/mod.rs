pub mod admin;
pub mod auth;
pub mod generate;
pub mod health;
pub mod rooms;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /admin/users/{id}/premium                        set premium (admin only)
///
/// /rooms                                           list by ids (public), create (auth)
/// /rooms/mine                                      caller's rooms (auth)
/// /rooms/{id}                                      overview (public), update, delete (owner)
/// /rooms/{id}/edit                                 edit view (owner)
/// /rooms/{id}/validate-progress                    unlocked chapters (public)
/// /rooms/{id}/chapters/{n}                         chapter page (public)
/// /rooms/{id}/chapters/{n}/answer                  check answer (public)
/// /rooms/{id}/chapters/{n}/validate-access         unlock check (public)
///
/// /generate/audio                                  chapter narration (premium)
/// /generate/escape-room                            AI room draft (premium)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/rooms", rooms::router())
        .nest("/generate", generate::router())
}
