use super::entities::{choice, vote, Choice, Vote};
use crate::domain::VoteReceipt;
use polls_errors::AppError;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, SqlErr, TransactionTrait};
use uuid::Uuid;

#[derive(Clone)]
pub struct VoteRepository {
    db: DatabaseConnection,
}

impl VoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records one vote and bumps the chosen tally, all in one transaction.
    ///
    /// The existing-vote check runs before the choice check, so a user who
    /// already voted always gets `AlreadyVoted`. A concurrent duplicate that
    /// slips past the check is stopped by the composite primary key.
    pub async fn cast(
        &self,
        user_id: Uuid,
        question_id: Uuid,
        choice_id: Option<Uuid>,
    ) -> Result<VoteReceipt, AppError> {
        let txn = self.db.begin().await?;

        let already_voted = Vote::find_by_id((user_id, question_id))
            .one(&txn)
            .await?
            .is_some();
        if already_voted {
            return Err(AppError::AlreadyVoted);
        }

        let choice_id = choice_id.ok_or(AppError::InvalidChoice)?;
        let selected = Choice::find_by_id(choice_id)
            .filter(choice::Column::QuestionId.eq(question_id))
            .one(&txn)
            .await?
            .ok_or(AppError::InvalidChoice)?;

        let active = vote::ActiveModel {
            user_id: Set(user_id),
            question_id: Set(question_id),
            choice_id: Set(selected.id),
            created_at: Set(Some(chrono::Utc::now())),
        };
        Vote::insert(active)
            .exec_without_returning(&txn)
            .await
            .map_err(map_insert_error)?;

        // Single UPDATE so concurrent voters never lose an increment.
        Choice::update_many()
            .col_expr(
                choice::Column::Votes,
                Expr::col(choice::Column::Votes).add(1),
            )
            .filter(choice::Column::Id.eq(selected.id))
            .exec(&txn)
            .await?;

        let new_tally = Choice::find_by_id(selected.id)
            .one(&txn)
            .await?
            .map(|c| c.votes)
            .ok_or(AppError::InvalidChoice)?;

        txn.commit().await?;

        Ok(VoteReceipt {
            question_id,
            choice_id: selected.id,
            new_tally,
        })
    }
}

fn map_insert_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyVoted,
        _ => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::{test_support, QuestionRepository};
    use chrono::{Duration, Utc};

    async fn setup() -> (DatabaseConnection, crate::domain::User, crate::domain::QuestionDetail) {
        let db = test_support::connection().await;
        let user = test_support::seed_user(&db, "voter").await;
        let now = Utc::now();
        let detail = test_support::seed_question(
            &db,
            "Favourite colour?",
            now,
            now + Duration::days(1),
            &["Red", "Blue"],
        )
        .await;
        (db, user, detail)
    }

    fn tallies(choices: &[crate::domain::Choice]) -> Vec<i32> {
        choices.iter().map(|c| c.votes).collect()
    }

    #[tokio::test]
    async fn test_cast_records_vote_and_increments_only_selected_choice() {
        let (db, user, detail) = setup().await;
        let repo = VoteRepository::new(db.clone());
        let red = detail.choices[0].id;

        let receipt = repo.cast(user.id, detail.question.id, Some(red)).await.unwrap();
        assert_eq!(receipt.new_tally, 1);
        assert_eq!(receipt.choice_id, red);

        let choices = QuestionRepository::new(db.clone())
            .choices_for(detail.question.id)
            .await
            .unwrap();
        assert_eq!(tallies(&choices), vec![1, 0]);

        let votes = Vote::find().all(&db).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].choice_id, red);
    }

    #[tokio::test]
    async fn test_second_vote_is_rejected_and_tallies_unchanged() {
        let (db, user, detail) = setup().await;
        let repo = VoteRepository::new(db.clone());
        let (red, blue) = (detail.choices[0].id, detail.choices[1].id);

        repo.cast(user.id, detail.question.id, Some(red)).await.unwrap();
        let second = repo.cast(user.id, detail.question.id, Some(blue)).await;
        assert!(matches!(second, Err(AppError::AlreadyVoted)));

        let choices = QuestionRepository::new(db.clone())
            .choices_for(detail.question.id)
            .await
            .unwrap();
        assert_eq!(tallies(&choices), vec![1, 0]);
        assert_eq!(Vote::find().all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_already_voted_wins_over_missing_choice() {
        let (db, user, detail) = setup().await;
        let repo = VoteRepository::new(db);

        repo.cast(user.id, detail.question.id, Some(detail.choices[0].id))
            .await
            .unwrap();
        let again = repo.cast(user.id, detail.question.id, None).await;
        assert!(matches!(again, Err(AppError::AlreadyVoted)));
    }

    #[tokio::test]
    async fn test_missing_or_foreign_choice_is_invalid() {
        let (db, user, detail) = setup().await;
        let now = Utc::now();
        let other = test_support::seed_question(
            &db,
            "Other question",
            now,
            now + Duration::days(1),
            &["Elsewhere"],
        )
        .await;
        let repo = VoteRepository::new(db.clone());

        let missing = repo.cast(user.id, detail.question.id, None).await;
        assert!(matches!(missing, Err(AppError::InvalidChoice)));

        let unknown = repo
            .cast(user.id, detail.question.id, Some(Uuid::new_v4()))
            .await;
        assert!(matches!(unknown, Err(AppError::InvalidChoice)));

        let foreign = repo
            .cast(user.id, detail.question.id, Some(other.choices[0].id))
            .await;
        assert!(matches!(foreign, Err(AppError::InvalidChoice)));

        assert!(!test_support::vote_exists(&db, user.id, detail.question.id).await);
        assert!(Vote::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_different_users_accumulate_on_same_choice() {
        let (db, alice, detail) = setup().await;
        let bob = test_support::seed_user(&db, "bob").await;
        let repo = VoteRepository::new(db.clone());
        let blue = detail.choices[1].id;

        repo.cast(alice.id, detail.question.id, Some(blue)).await.unwrap();
        let receipt = repo.cast(bob.id, detail.question.id, Some(blue)).await.unwrap();
        assert_eq!(receipt.new_tally, 2);

        let stored = Vote::find_by_id((bob.id, detail.question.id))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.choice_id, blue);
    }

    #[tokio::test]
    async fn test_duplicate_vote_row_maps_to_already_voted() {
        let (db, user, detail) = setup().await;
        let row = || vote::ActiveModel {
            user_id: Set(user.id),
            question_id: Set(detail.question.id),
            choice_id: Set(detail.choices[0].id),
            created_at: Set(None),
        };

        Vote::insert(row()).exec_without_returning(&db).await.unwrap();
        let err = Vote::insert(row())
            .exec_without_returning(&db)
            .await
            .unwrap_err();
        assert!(matches!(map_insert_error(err), AppError::AlreadyVoted));
    }

    #[tokio::test]
    async fn test_concurrent_double_submit_counts_once() {
        let db = test_support::file_connection(2).await;
        let user = test_support::seed_user(&db, "racer").await;
        let now = Utc::now();
        let detail = test_support::seed_question(
            &db,
            "Left or right?",
            now,
            now + Duration::days(1),
            &["Left", "Right"],
        )
        .await;
        let repo = VoteRepository::new(db.clone());
        let question_id = detail.question.id;

        let (first, second) = tokio::join!(
            repo.cast(user.id, question_id, Some(detail.choices[0].id)),
            repo.cast(user.id, question_id, Some(detail.choices[1].id)),
        );
        let outcomes = [first, second];

        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        // SQLite rejects the losing writer with a lock conflict rather than a key violation.
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::AlreadyVoted | AppError::Database(_)))));

        assert_eq!(Vote::find().all(&db).await.unwrap().len(), 1);
        let choices = QuestionRepository::new(db)
            .choices_for(question_id)
            .await
            .unwrap();
        assert_eq!(tallies(&choices).iter().sum::<i32>(), 1);
    }

    #[tokio::test]
    async fn test_votes_cascade_with_user_deletion() {
        let (db, user, detail) = setup().await;
        let repo = VoteRepository::new(db.clone());
        repo.cast(user.id, detail.question.id, Some(detail.choices[0].id))
            .await
            .unwrap();

        crate::infrastructure::db::UserRepository::new(db.clone())
            .delete(user.id)
            .await
            .unwrap();

        assert!(!test_support::vote_exists(&db, user.id, detail.question.id).await);
        // Tallies are history; deleting a voter does not rewrite them.
        let choices = QuestionRepository::new(db)
            .choices_for(detail.question.id)
            .await
            .unwrap();
        assert_eq!(tallies(&choices), vec![1, 0]);
    }
}
