pub mod entities;
mod question_repository;
mod user_repository;
mod vote_repository;

pub use question_repository::{NewQuestion, QuestionRepository};
pub use user_repository::{NewAccount, ProfileChanges, UserRepository};
pub use vote_repository::VoteRepository;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Schema, Statement,
};
use std::time::Duration;

pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Applies `migrations/001_initial.sql` on PostgreSQL. Other backends get the
/// schema derived from the entity definitions.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    match db.get_database_backend() {
        DatabaseBackend::Postgres => run_sql_migrations(db).await,
        backend => create_schema_from_entities(db, backend).await,
    }
}

async fn run_sql_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    let migration = include_str!("../../../../migrations/001_initial.sql");

    // Every statement is idempotent (IF NOT EXISTS), so failures are real.
    for statement in migration.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            db.execute(Statement::from_string(
                DatabaseBackend::Postgres,
                statement.to_string(),
            ))
            .await?;
        }
    }

    tracing::info!("Database migrations applied");
    Ok(())
}

async fn create_schema_from_entities(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
) -> Result<(), DbErr> {
    let schema = Schema::new(backend);
    let statements = [
        schema
            .create_table_from_entity(entities::User)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(entities::UserProfile)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(entities::Question)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(entities::Choice)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(entities::Vote)
            .if_not_exists()
            .to_owned(),
    ];

    for statement in &statements {
        db.execute(backend.build(statement)).await?;
    }

    tracing::info!(?backend, "Schema created from entity definitions");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::{ChoiceInput, User};
    use chrono::{DateTime, Utc};

    /// Fresh in-memory SQLite database with the full schema.
    pub async fn connection() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.expect("sqlite connects");
        run_migrations(&db).await.expect("schema is created");
        db
    }

    /// File-backed database so that several pooled connections share one schema.
    pub async fn file_connection(max_connections: u32) -> DatabaseConnection {
        let path = std::env::temp_dir().join(format!("polls-{}.db", uuid::Uuid::new_v4()));
        let mut opt = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
        opt.max_connections(max_connections)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opt).await.expect("sqlite file connects");
        run_migrations(&db).await.expect("schema is created");
        db
    }

    pub async fn seed_user(db: &DatabaseConnection, username: &str) -> User {
        let repo = UserRepository::new(db.clone());
        let account = NewAccount {
            user: User::new(username.to_string(), format!("{username}@example.com")),
            password_hash: "not-a-real-hash".to_string(),
            avatar: format!("avatars/{username}.png"),
            bio: None,
        };
        repo.create_with_profile(&account)
            .await
            .expect("user is inserted")
            .user
    }

    pub async fn vote_exists(
        db: &DatabaseConnection,
        user_id: uuid::Uuid,
        question_id: uuid::Uuid,
    ) -> bool {
        use sea_orm::EntityTrait;

        entities::Vote::find_by_id((user_id, question_id))
            .one(db)
            .await
            .expect("votes are readable")
            .is_some()
    }

    pub async fn seed_question(
        db: &DatabaseConnection,
        text: &str,
        pub_date: DateTime<Utc>,
        expiration_date: DateTime<Utc>,
        choices: &[&str],
    ) -> crate::domain::QuestionDetail {
        let repo = QuestionRepository::new(db.clone());
        let new_question = NewQuestion {
            question_text: text.to_string(),
            short_description: format!("{text} (short)"),
            description: String::new(),
            image: None,
            pub_date,
            expiration_date,
        };
        let choices: Vec<ChoiceInput> = choices.iter().map(|c| ChoiceInput::new(*c)).collect();
        let question = repo
            .create_with_choices(&new_question, &choices)
            .await
            .expect("question is inserted");
        let choices = repo
            .choices_for(question.id)
            .await
            .expect("choices are readable");
        crate::domain::QuestionDetail::new(question, choices, Utc::now())
    }
}
