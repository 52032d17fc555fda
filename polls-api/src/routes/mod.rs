mod accounts;
mod polls;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use polls_app::{AppContext, AppError};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use uuid::Uuid;

const SESSION_IDLE_DAYS: i64 = 14;

pub fn router(ctx: AppContext) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(ctx.config.session_secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(SESSION_IDLE_DAYS)));

    Router::new()
        .route("/", get(polls::index))
        .route("/questions", post(polls::create_question))
        .route("/questions/new", get(polls::new_question))
        .route(
            "/questions/{id}",
            get(polls::detail).delete(polls::delete_question),
        )
        .route("/questions/{id}/results", get(polls::results))
        .route("/questions/{id}/vote", post(polls::vote))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route("/profile", get(accounts::profile))
        .route("/profile/edit", post(accounts::edit_profile))
        .route("/profile/delete", post(accounts::delete_profile))
        .nest_service("/media", ServeDir::new(ctx.media.root()))
        .layer(DefaultBodyLimit::max(ctx.config.max_upload_bytes))
        .layer(sessions)
        .layer(CompressionLayer::new())
        .with_state(ctx)
}

/// Unparseable ids are just ids that do not exist.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}
