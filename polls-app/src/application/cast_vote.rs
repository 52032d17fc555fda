use super::BrowseQuestions;
use crate::domain::{User, VoteReceipt};
use crate::infrastructure::db::VoteRepository;
use crate::infrastructure::security::InputValidator;
use chrono::{DateTime, Utc};
use polls_errors::AppError;
use uuid::Uuid;

pub struct CastVote {
    browse: BrowseQuestions,
    votes: VoteRepository,
}

impl CastVote {
    pub fn new(browse: BrowseQuestions, votes: VoteRepository) -> Self {
        Self { browse, votes }
    }

    /// `raw_choice` is the submitted form value, untouched.
    pub async fn execute(
        &self,
        voter: &User,
        question_id: Uuid,
        raw_choice: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<VoteReceipt, AppError> {
        let question = self
            .browse
            .visible_question(question_id, Some(voter), now)
            .await?;

        let choice_id = InputValidator::choice_id(raw_choice);
        let receipt = self.votes.cast(voter.id, question.id, choice_id).await?;

        tracing::info!(
            user_id = %voter.id,
            question_id = %question.id,
            choice_id = %receipt.choice_id,
            tally = receipt.new_tally,
            "Vote recorded"
        );
        Ok(receipt)
    }
}
