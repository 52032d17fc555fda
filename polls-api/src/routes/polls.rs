use super::parse_id;
use crate::multipart::MultipartForm;
use crate::session::{CurrentUser, Viewer};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use chrono::Utc;
use polls_app::application::AuthoringTemplate;
use polls_app::domain::{PollResults, QuestionDetail, QuestionSummary};
use polls_app::{AppContext, AppError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct VoteForm {
    choice: Option<String>,
}

pub async fn index(
    State(ctx): State<AppContext>,
    viewer: Viewer,
) -> Result<Json<Vec<QuestionSummary>>, AppError> {
    let questions = ctx.browse.list(viewer.user(), Utc::now()).await?;
    Ok(Json(questions))
}

pub async fn detail(
    State(ctx): State<AppContext>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<QuestionDetail>, AppError> {
    let id = parse_id(&id)?;
    let detail = ctx.browse.detail(id, viewer.user(), Utc::now()).await?;
    Ok(Json(detail))
}

pub async fn results(
    State(ctx): State<AppContext>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<PollResults>, AppError> {
    let id = parse_id(&id)?;
    let results = ctx.browse.results(id, viewer.user(), Utc::now()).await?;
    Ok(Json(results))
}

/// Success redirects to the results page. A duplicate or missing choice
/// re-renders the question with the error message attached.
pub async fn vote(
    State(ctx): State<AppContext>,
    current: CurrentUser,
    Path(id): Path<String>,
    Form(form): Form<VoteForm>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let now = Utc::now();

    match ctx
        .cast_vote
        .execute(&current.user, id, form.choice.as_deref(), now)
        .await
    {
        Ok(receipt) => {
            Ok(Redirect::to(&format!("/questions/{}/results", receipt.question_id)).into_response())
        }
        Err(err @ (AppError::AlreadyVoted | AppError::InvalidChoice)) => {
            let detail = ctx
                .browse
                .detail(id, Some(&current.user), now)
                .await?
                .with_error(err.user_message());
            Ok((err.status_code(), Json(detail)).into_response())
        }
        Err(err) => Err(err),
    }
}

pub async fn new_question(
    State(ctx): State<AppContext>,
    _current: CurrentUser,
) -> Json<AuthoringTemplate> {
    Json(ctx.author_questions.template())
}

pub async fn create_question(
    State(ctx): State<AppContext>,
    current: CurrentUser,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let form = MultipartForm::read(multipart).await?.into_question_form();
    ctx.author_questions
        .create(&current.user, form, Utc::now())
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_question(
    State(ctx): State<AppContext>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    ctx.author_questions.delete(&current.user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
