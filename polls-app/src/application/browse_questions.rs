use crate::domain::{PollResults, Question, QuestionDetail, QuestionSummary, User};
use crate::infrastructure::db::QuestionRepository;
use chrono::{DateTime, Utc};
use polls_errors::AppError;
use uuid::Uuid;

/// Read side of the polls: listing, detail and results, all behind the
/// expiration gate.
#[derive(Clone)]
pub struct BrowseQuestions {
    questions: QuestionRepository,
}

impl BrowseQuestions {
    pub fn new(questions: QuestionRepository) -> Self {
        Self { questions }
    }

    pub async fn list(
        &self,
        viewer: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<Vec<QuestionSummary>, AppError> {
        let questions = self.questions.list(is_admin(viewer), now).await?;
        Ok(questions
            .into_iter()
            .map(|q| QuestionSummary::from_question(q, now))
            .collect())
    }

    pub async fn detail(
        &self,
        id: Uuid,
        viewer: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<QuestionDetail, AppError> {
        let question = self.visible_question(id, viewer, now).await?;
        let choices = self.questions.choices_for(question.id).await?;
        Ok(QuestionDetail::new(question, choices, now))
    }

    pub async fn results(
        &self,
        id: Uuid,
        viewer: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<PollResults, AppError> {
        let question = self.visible_question(id, viewer, now).await?;
        let choices = self.questions.choices_for(question.id).await?;
        Ok(PollResults::compute(question, choices))
    }

    /// Expired questions look exactly like missing ones to non-admins.
    pub async fn visible_question(
        &self,
        id: Uuid,
        viewer: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<Question, AppError> {
        let question = self
            .questions
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !question.is_visible_to(is_admin(viewer), now) {
            tracing::debug!(question_id = %id, "Expired question hidden from viewer");
            return Err(AppError::NotFound);
        }

        Ok(question)
    }
}

fn is_admin(viewer: Option<&User>) -> bool {
    viewer.is_some_and(User::is_admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::{test_support, VoteRepository};
    use chrono::Duration;

    fn admin() -> User {
        let mut user = User::new("root".to_string(), "root@example.com".to_string());
        user.is_staff = true;
        user
    }

    fn visitor() -> User {
        User::new("visitor".to_string(), "visitor@example.com".to_string())
    }

    #[tokio::test]
    async fn test_expired_question_is_not_found_for_non_admin() {
        let db = test_support::connection().await;
        let now = Utc::now();
        let expired = test_support::seed_question(
            &db,
            "Old news",
            now - Duration::days(10),
            now - Duration::days(1),
            &["yes", "no"],
        )
        .await;
        let browse = BrowseQuestions::new(QuestionRepository::new(db));
        let id = expired.question.id;

        assert!(matches!(
            browse.detail(id, None, now).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            browse.detail(id, Some(&visitor()), now).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            browse.results(id, Some(&visitor()), now).await,
            Err(AppError::NotFound)
        ));

        let detail = browse.detail(id, Some(&admin()), now).await.unwrap();
        assert_eq!(detail.choices.len(), 2);
        assert!(browse.results(id, Some(&admin()), now).await.is_ok());
    }

    #[tokio::test]
    async fn test_superuser_counts_as_admin() {
        let db = test_support::connection().await;
        let now = Utc::now();
        let expired = test_support::seed_question(
            &db,
            "Old news",
            now - Duration::days(10),
            now - Duration::days(1),
            &["yes"],
        )
        .await;
        let browse = BrowseQuestions::new(QuestionRepository::new(db));
        let mut superuser = visitor();
        superuser.is_superuser = true;

        assert!(browse
            .detail(expired.question.id, Some(&superuser), now)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_list_respects_viewer_privilege() {
        let db = test_support::connection().await;
        let now = Utc::now();
        test_support::seed_question(&db, "Live", now, now + Duration::days(1), &["a"]).await;
        test_support::seed_question(
            &db,
            "Gone",
            now - Duration::days(3),
            now - Duration::days(2),
            &["a"],
        )
        .await;
        let browse = BrowseQuestions::new(QuestionRepository::new(db));

        let public = browse.list(None, now).await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].question_text, "Live");
        assert!(public[0].recently_published);

        let everything = browse.list(Some(&admin()), now).await.unwrap();
        assert_eq!(everything.len(), 2);
    }

    #[tokio::test]
    async fn test_results_reflect_current_tallies() {
        let db = test_support::connection().await;
        let now = Utc::now();
        let detail =
            test_support::seed_question(&db, "Pick", now, now + Duration::days(1), &["A", "B"])
                .await;
        let votes = VoteRepository::new(db.clone());
        for name in ["u1", "u2", "u3"] {
            let user = test_support::seed_user(&db, name).await;
            votes
                .cast(user.id, detail.question.id, Some(detail.choices[0].id))
                .await
                .unwrap();
        }
        let user = test_support::seed_user(&db, "u4").await;
        votes
            .cast(user.id, detail.question.id, Some(detail.choices[1].id))
            .await
            .unwrap();

        let browse = BrowseQuestions::new(QuestionRepository::new(db));
        let results = browse.results(detail.question.id, None, now).await.unwrap();
        assert_eq!(results.total_votes, 4);
        assert_eq!(results.percentage_of(detail.choices[0].id), Some(75.0));
        assert_eq!(results.percentage_of(detail.choices[1].id), Some(25.0));
    }

    #[tokio::test]
    async fn test_unknown_question_is_not_found() {
        let db = test_support::connection().await;
        let browse = BrowseQuestions::new(QuestionRepository::new(db));
        assert!(matches!(
            browse.detail(Uuid::new_v4(), Some(&admin()), Utc::now()).await,
            Err(AppError::NotFound)
        ));
    }
}
