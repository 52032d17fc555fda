use super::entities::{choice, question, Choice, Question};
use crate::domain::{self, ChoiceInput};
use chrono::{DateTime, Utc};
use sea_orm::{entity::*, query::*, DatabaseConnection, DbErr, TransactionTrait};
use uuid::Uuid;

/// Validated question fields ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub short_description: String,
    pub description: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct QuestionRepository {
    db: DatabaseConnection,
}

impl QuestionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts the question and every kept choice in one transaction.
    pub async fn create_with_choices(
        &self,
        new_question: &NewQuestion,
        choices: &[ChoiceInput],
    ) -> Result<domain::Question, DbErr> {
        let txn = self.db.begin().await?;

        let active = question::ActiveModel {
            id: Set(Uuid::new_v4()),
            question_text: Set(new_question.question_text.clone()),
            short_description: Set(new_question.short_description.clone()),
            description: Set(new_question.description.clone()),
            image: Set(new_question.image.clone()),
            pub_date: Set(new_question.pub_date),
            expiration_date: Set(new_question.expiration_date),
        };
        let created = active.insert(&txn).await?;

        let kept = choices.iter().filter(|c| c.is_kept());
        for (order, input) in kept.enumerate() {
            let choice = choice::ActiveModel {
                id: Set(Uuid::new_v4()),
                question_id: Set(created.id),
                choice_text: Set(input.text.trim().to_string()),
                votes: Set(0),
                display_order: Set(order as i32),
            };
            choice.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(created.into())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<domain::Question>, DbErr> {
        Ok(Question::find_by_id(id).one(&self.db).await?.map(Into::into))
    }

    /// Newest first. Expired questions are left out unless `include_expired`.
    pub async fn list(
        &self,
        include_expired: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<domain::Question>, DbErr> {
        let mut query = Question::find().order_by_desc(question::Column::PubDate);
        if !include_expired {
            query = query.filter(question::Column::ExpirationDate.gte(now));
        }

        let rows = query.all(&self.db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn choices_for(&self, question_id: Uuid) -> Result<Vec<domain::Choice>, DbErr> {
        let rows = Choice::find()
            .filter(choice::Column::QuestionId.eq(question_id))
            .order_by_asc(choice::Column::DisplayOrder)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Returns whether a row was removed. Choices and votes cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let result = Question::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }
}

impl From<question::Model> for domain::Question {
    fn from(m: question::Model) -> Self {
        Self {
            id: m.id,
            question_text: m.question_text,
            short_description: m.short_description,
            description: m.description,
            image: m.image,
            pub_date: m.pub_date,
            expiration_date: m.expiration_date,
        }
    }
}

impl From<choice::Model> for domain::Choice {
    fn from(m: choice::Model) -> Self {
        Self {
            id: m.id,
            question_id: m.question_id,
            choice_text: m.choice_text,
            votes: m.votes,
            display_order: m.display_order,
        }
    }
}
