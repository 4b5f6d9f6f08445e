pub mod health;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /folders                 list, create
/// /folders/{id}            rename (PATCH), delete
/// /notes                   list (?search=&folderId=), create
/// /notes/{id}              get, update (PATCH), delete
/// /notes/{id}/share        issue (POST), revoke (DELETE)
/// /shared/{token}          resolve (public projection)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folders::list).post(handlers::folders::create),
        )
        .route(
            "/folders/{id}",
            patch(handlers::folders::rename).delete(handlers::folders::delete),
        )
        .route(
            "/notes",
            get(handlers::notes::list).post(handlers::notes::create),
        )
        .route(
            "/notes/{id}",
            get(handlers::notes::get_by_id)
                .patch(handlers::notes::update)
                .delete(handlers::notes::delete),
        )
        .route(
            "/notes/{id}/share",
            post(handlers::share::issue).delete(handlers::share::revoke),
        )
        .route("/shared/{token}", get(handlers::share::resolve))
}
