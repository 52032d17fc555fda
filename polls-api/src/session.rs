use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use polls_app::domain::User;
use polls_app::{AppContext, AppError};
use std::convert::Infallible;
use std::net::SocketAddr;
use tower_sessions::Session;
use uuid::Uuid;

const USER_ID_KEY: &str = "user_id";

/// Whoever is making the request, signed in or not.
pub struct Viewer {
    pub user: Option<User>,
}

impl Viewer {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

impl FromRequestParts<AppContext> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let session = load_session(parts, ctx).await?;
        let user_id: Option<Uuid> = session.get(USER_ID_KEY).await.map_err(session_error)?;

        // A session can outlive its account.
        let user = match user_id {
            Some(id) => ctx.users.find_by_id(id).await?,
            None => None,
        };
        Ok(Self { user })
    }
}

/// A signed-in user. Rejects with 401 otherwise.
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let session = load_session(parts, ctx).await?;
        let user_id: Uuid = session
            .get(USER_ID_KEY)
            .await
            .map_err(session_error)?
            .ok_or(AppError::Unauthorized)?;

        let user = ctx
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(Self { user, session })
    }
}

/// Rate-limit key for the caller: the peer IP when the server exposes it.
pub struct ClientKey(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(key))
    }
}

/// Binds the session to `user` under a fresh id.
pub async fn log_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(USER_ID_KEY, user.id)
        .await
        .map_err(session_error)
}

pub async fn log_out(session: &Session) -> Result<(), AppError> {
    session.flush().await.map_err(session_error)
}

async fn load_session(parts: &mut Parts, ctx: &AppContext) -> Result<Session, AppError> {
    Session::from_request_parts(parts, ctx)
        .await
        .map_err(|(_, message)| AppError::Internal(message.to_string()))
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("Session store error: {err}"))
}
