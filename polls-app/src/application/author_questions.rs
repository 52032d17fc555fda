use crate::domain::{QuestionDetail, QuestionForm, User, DEFAULT_CHOICE_SLOTS};
use crate::infrastructure::db::{NewQuestion, QuestionRepository};
use crate::infrastructure::media::{MediaStore, QUESTION_IMAGE_DIR};
use crate::infrastructure::security::{
    InputValidator, CHOICE_TEXT_MAX_LENGTH, QUESTION_TEXT_MAX_LENGTH,
    SHORT_DESCRIPTION_MAX_LENGTH,
};
use chrono::{DateTime, Utc};
use polls_errors::{AppError, FieldErrors};
use serde::Serialize;
use uuid::Uuid;

/// What a client needs to render an empty authoring form.
#[derive(Debug, Clone, Serialize)]
pub struct AuthoringTemplate {
    pub choice_slots: usize,
    pub question_text_max_length: usize,
    pub short_description_max_length: usize,
    pub choice_text_max_length: usize,
}

impl Default for AuthoringTemplate {
    fn default() -> Self {
        Self {
            choice_slots: DEFAULT_CHOICE_SLOTS,
            question_text_max_length: QUESTION_TEXT_MAX_LENGTH,
            short_description_max_length: SHORT_DESCRIPTION_MAX_LENGTH,
            choice_text_max_length: CHOICE_TEXT_MAX_LENGTH,
        }
    }
}

/// Question creation for signed-in users, deletion for administrators.
pub struct AuthorQuestions {
    questions: QuestionRepository,
    media: MediaStore,
}

impl AuthorQuestions {
    pub fn new(questions: QuestionRepository, media: MediaStore) -> Self {
        Self { questions, media }
    }

    pub fn template(&self) -> AuthoringTemplate {
        AuthoringTemplate::default()
    }

    pub async fn create(
        &self,
        author: &User,
        form: QuestionForm,
        now: DateTime<Utc>,
    ) -> Result<QuestionDetail, AppError> {
        let mut errors = FieldErrors::new();
        let question_text = InputValidator::text(
            "question_text",
            &form.question_text,
            QUESTION_TEXT_MAX_LENGTH,
            true,
            &mut errors,
        );
        let short_description = InputValidator::text(
            "short_description",
            &form.short_description,
            SHORT_DESCRIPTION_MAX_LENGTH,
            true,
            &mut errors,
        );
        let expiration_date =
            InputValidator::datetime("expiration_date", &form.expiration_date, &mut errors);
        let image_format = InputValidator::image("image", form.image.as_ref(), false, &mut errors);

        for (position, choice) in form.choices.iter().enumerate() {
            if choice.is_kept() {
                InputValidator::text(
                    &choice.text_field(position),
                    &choice.text,
                    CHOICE_TEXT_MAX_LENGTH,
                    true,
                    &mut errors,
                );
            }
        }
        if !form.choices.iter().any(|c| c.is_kept()) {
            errors.add("choices", "Add at least one choice.");
        }

        errors.into_result()?;
        let expiration_date = expiration_date
            .ok_or_else(|| AppError::Internal("expiration date missing after validation".into()))?;

        let image = match form.image.as_ref().zip(image_format) {
            Some((upload, format)) => {
                Some(self.media.save(QUESTION_IMAGE_DIR, upload, format).await?)
            }
            None => None,
        };

        let new_question = NewQuestion {
            question_text,
            short_description,
            description: form.description.trim().to_string(),
            image: image.clone(),
            pub_date: now,
            expiration_date,
        };

        let question = match self
            .questions
            .create_with_choices(&new_question, &form.choices)
            .await
        {
            Ok(question) => question,
            Err(e) => {
                if let Some(path) = &image {
                    self.media.remove(path).await;
                }
                return Err(e.into());
            }
        };
        let choices = self.questions.choices_for(question.id).await?;

        tracing::info!(
            question_id = %question.id,
            author_id = %author.id,
            choices = choices.len(),
            "Question created"
        );
        Ok(QuestionDetail::new(question, choices, now))
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden);
        }

        let question = self
            .questions
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        if !self.questions.delete(id).await? {
            return Err(AppError::NotFound);
        }
        if let Some(image) = &question.image {
            self.media.remove(image).await;
        }

        tracing::info!(question_id = %id, admin_id = %actor.id, "Question deleted");
        Ok(())
    }
}
