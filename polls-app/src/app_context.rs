use crate::application::{
    Authenticate, AuthorQuestions, BrowseQuestions, CastVote, ManageProfile, RegisterUser,
};
use crate::config::Config;
use crate::infrastructure::db::{self, QuestionRepository, UserRepository, VoteRepository};
use crate::infrastructure::media::MediaStore;
use crate::infrastructure::security::RateLimiter;
use polls_errors::AppError;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub users: UserRepository,
    pub browse: BrowseQuestions,
    pub cast_vote: Arc<CastVote>,
    pub author_questions: Arc<AuthorQuestions>,
    pub register_user: Arc<RegisterUser>,
    pub authenticate: Arc<Authenticate>,
    pub manage_profile: Arc<ManageProfile>,
    pub rate_limiter: RateLimiter,
    pub media: MediaStore,
}

impl AppContext {
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let users = UserRepository::new(db.clone());
        let questions = QuestionRepository::new(db.clone());
        let votes = VoteRepository::new(db);
        let media = MediaStore::new(config.media_root.clone());
        let browse = BrowseQuestions::new(questions.clone());

        Self {
            config: Arc::new(config),
            users: users.clone(),
            browse: browse.clone(),
            cast_vote: Arc::new(CastVote::new(browse, votes)),
            author_questions: Arc::new(AuthorQuestions::new(questions, media.clone())),
            register_user: Arc::new(RegisterUser::new(users.clone(), media.clone())),
            authenticate: Arc::new(Authenticate::new(users.clone())),
            manage_profile: Arc::new(ManageProfile::new(users, media.clone())),
            rate_limiter: RateLimiter::new(),
            media,
        }
    }

    /// Connects, applies migrations and wires every service.
    pub async fn connect(config: Config) -> Result<Self, AppError> {
        let db = db::create_connection(&config.database_url).await?;
        db::run_migrations(&db).await?;
        tracing::info!("Database ready");
        Ok(Self::new(db, config))
    }
}
