use crate::multipart::MultipartForm;
use crate::session::{self, ClientKey, CurrentUser};
use axum::extract::{Multipart, State};
use axum::response::Redirect;
use axum::{Form, Json};
use polls_app::domain::{LoginForm, Profile};
use polls_app::{AppContext, AppError};
use tower_sessions::Session;

pub async fn register(
    State(ctx): State<AppContext>,
    session: Session,
    ClientKey(client): ClientKey,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    ctx.rate_limiter.check(&client)?;

    let form = MultipartForm::read(multipart).await?.into_registration();
    let profile = ctx.register_user.execute(form).await?;
    session::log_in(&session, &profile.user).await?;
    Ok(Redirect::to("/"))
}

pub async fn login(
    State(ctx): State<AppContext>,
    session: Session,
    ClientKey(client): ClientKey,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    ctx.rate_limiter.check(&client)?;

    let user = ctx.authenticate.execute(&form).await?;
    session::log_in(&session, &user).await?;
    Ok(Redirect::to("/"))
}

pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session::log_out(&session).await?;
    Ok(Redirect::to("/"))
}

pub async fn profile(
    State(ctx): State<AppContext>,
    current: CurrentUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(ctx.manage_profile.show(current.user.id).await?))
}

pub async fn edit_profile(
    State(ctx): State<AppContext>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let form = MultipartForm::read(multipart).await?.into_profile_edit();
    ctx.manage_profile.edit(current.user.id, form).await?;
    Ok(Redirect::to("/profile"))
}

pub async fn delete_profile(
    State(ctx): State<AppContext>,
    current: CurrentUser,
) -> Result<Redirect, AppError> {
    ctx.manage_profile.delete(current.user.id).await?;
    session::log_out(&current.session).await?;
    Ok(Redirect::to("/"))
}
