use axum::extract::multipart::{Multipart, MultipartError};
use polls_app::domain::{ChoiceInput, ProfileEditForm, QuestionForm, RegistrationForm, Upload};
use polls_app::AppError;
use std::collections::{BTreeMap, HashMap};

/// A multipart submission drained into memory: text fields and file fields.
#[derive(Debug, Default)]
pub struct MultipartForm {
    text: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await.map_err(malformed)?;
                    // Browsers send an empty part for an untouched file input.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(name, Upload::new(file_name, bytes.to_vec()));
                }
                None => {
                    let value = field.text().await.map_err(malformed)?;
                    form.text.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    fn text(&self, name: &str) -> String {
        self.text.get(name).cloned().unwrap_or_default()
    }

    fn optional_text(&self, name: &str) -> Option<String> {
        self.text.get(name).cloned()
    }

    fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }

    /// Collects `choices-<n>-text` / `choices-<n>-delete` rows in index order.
    fn choices(&self) -> Vec<ChoiceInput> {
        let mut rows: BTreeMap<usize, ChoiceInput> = BTreeMap::new();

        for (name, value) in &self.text {
            let Some((index, column)) = parse_choice_field(name) else {
                continue;
            };
            let row = rows
                .entry(index)
                .or_insert_with(|| ChoiceInput::at_slot(index, ""));
            match column {
                "text" => row.text = value.clone(),
                "delete" => row.delete = is_checked(value),
                _ => {}
            }
        }

        rows.into_values().collect()
    }

    pub fn into_registration(mut self) -> RegistrationForm {
        RegistrationForm {
            username: self.text("username"),
            email: self.text("email"),
            password1: self.text("password1"),
            password2: self.text("password2"),
            avatar: self.take_file("avatar"),
            bio: self.optional_text("bio"),
        }
    }

    pub fn into_profile_edit(mut self) -> ProfileEditForm {
        ProfileEditForm {
            username: self.text("username"),
            email: self.text("email"),
            first_name: self.text("first_name"),
            last_name: self.text("last_name"),
            avatar: self.take_file("avatar"),
            bio: self.optional_text("bio"),
        }
    }

    pub fn into_question_form(mut self) -> QuestionForm {
        QuestionForm {
            question_text: self.text("question_text"),
            short_description: self.text("short_description"),
            description: self.text("description"),
            expiration_date: self.text("expiration_date"),
            choices: self.choices(),
            image: self.take_file("image"),
        }
    }
}

fn parse_choice_field(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix("choices-")?;
    let (index, column) = rest.split_once('-')?;
    Some((index.parse().ok()?, column))
}

fn is_checked(value: &str) -> bool {
    let value = value.trim();
    ["on", "true", "1", "yes"]
        .iter()
        .any(|accepted| value.eq_ignore_ascii_case(accepted))
}

fn malformed(err: MultipartError) -> AppError {
    AppError::MalformedPayload(err.body_text())
}
