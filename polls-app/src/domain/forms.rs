//! Raw submissions as they arrive from the HTTP layer, before validation.

use serde::{Deserialize, Serialize};

/// Blank choice rows offered on the authoring form.
pub const DEFAULT_CHOICE_SLOTS: usize = 5;

/// An uploaded file held in memory until it is validated and stored.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
    pub avatar: Option<Upload>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileEditForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Replaces the current avatar when present.
    pub avatar: Option<Upload>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceInput {
    pub text: String,
    #[serde(default)]
    pub delete: bool,
    /// The `<n>` of the submitted `choices-<n>-*` row, when known.
    #[serde(default)]
    pub slot: Option<usize>,
}

impl ChoiceInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            delete: false,
            slot: None,
        }
    }

    pub fn at_slot(slot: usize, text: impl Into<String>) -> Self {
        Self {
            slot: Some(slot),
            ..Self::new(text)
        }
    }

    /// Form field carrying this row's text.
    pub fn text_field(&self, position: usize) -> String {
        format!("choices-{}-text", self.slot.unwrap_or(position))
    }

    /// Blank and delete-flagged rows are not saved.
    pub fn is_kept(&self) -> bool {
        !self.delete && !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuestionForm {
    pub question_text: String,
    pub short_description: String,
    pub description: String,
    pub image: Option<Upload>,
    pub expiration_date: String,
    pub choices: Vec<ChoiceInput>,
}
