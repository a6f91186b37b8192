//! Route definitions for `/admin`.

use axum::routing::put;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the `admin` role.
///
/// ```text
/// PUT /users/{id}/premium -> set_premium
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}/premium", put(admin::set_premium))
}
