use crate::domain::{LoginForm, Profile, ProfileEditForm, RegistrationForm, User};
use crate::infrastructure::db::{NewAccount, ProfileChanges, UserRepository};
use crate::infrastructure::media::{MediaStore, AVATAR_DIR};
use crate::infrastructure::security::{InputValidator, PasswordHasher, NAME_MAX_LENGTH};
use polls_errors::{AppError, FieldErrors};
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// Creates a user and its profile from a registration form.
pub struct RegisterUser {
    users: UserRepository,
    media: MediaStore,
}

impl RegisterUser {
    pub fn new(users: UserRepository, media: MediaStore) -> Self {
        Self { users, media }
    }

    pub async fn execute(&self, form: RegistrationForm) -> Result<Profile, AppError> {
        let mut errors = FieldErrors::new();
        let username = InputValidator::username(&form.username, &mut errors);
        let email = InputValidator::email(&form.email, &mut errors);
        InputValidator::passwords(&username, &form.password1, &form.password2, &mut errors);
        let avatar_format = InputValidator::image("avatar", form.avatar.as_ref(), true, &mut errors);

        if !errors.has("username") && self.users.username_taken(&username, None).await? {
            errors.add("username", USERNAME_TAKEN);
        }
        let avatar = form.avatar.as_ref().zip(avatar_format);
        errors.into_result()?;
        let (upload, format) = avatar.ok_or_else(|| required("avatar"))?;

        let password_hash = PasswordHasher::hash(&form.password1)?;
        let avatar_path = self.media.save(AVATAR_DIR, upload, format).await?;

        let account = NewAccount {
            user: User::new(username, email),
            password_hash,
            avatar: avatar_path.clone(),
            bio: normalize_bio(form.bio.as_deref()),
        };

        match self.users.create_with_profile(&account).await {
            Ok(profile) => {
                tracing::info!(user_id = %profile.user.id, username = %profile.user.username, "User registered");
                Ok(profile)
            }
            Err(e) => {
                self.media.remove(&avatar_path).await;
                Err(map_username_conflict(e))
            }
        }
    }
}

/// Checks a username/password pair.
pub struct Authenticate {
    users: UserRepository,
}

impl Authenticate {
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    pub async fn execute(&self, form: &LoginForm) -> Result<User, AppError> {
        let username = form.username.trim();
        if username.is_empty() || form.password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        match self.users.find_credentials(username).await? {
            Some((user, hash)) if PasswordHasher::verify(&hash, &form.password) => {
                tracing::info!(user_id = %user.id, "User logged in");
                Ok(user)
            }
            _ => {
                tracing::warn!(username, "Failed login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}

/// Profile page, edits and account deletion for the signed-in user.
pub struct ManageProfile {
    users: UserRepository,
    media: MediaStore,
}

impl ManageProfile {
    pub fn new(users: UserRepository, media: MediaStore) -> Self {
        Self { users, media }
    }

    pub async fn show(&self, user_id: Uuid) -> Result<Profile, AppError> {
        self.users
            .find_profile(user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn edit(&self, user_id: Uuid, form: ProfileEditForm) -> Result<Profile, AppError> {
        let current = self.show(user_id).await?;

        let mut errors = FieldErrors::new();
        let username = InputValidator::username(&form.username, &mut errors);
        let email = InputValidator::email(&form.email, &mut errors);
        let first_name = InputValidator::text(
            "first_name",
            &form.first_name,
            NAME_MAX_LENGTH,
            false,
            &mut errors,
        );
        let last_name = InputValidator::text(
            "last_name",
            &form.last_name,
            NAME_MAX_LENGTH,
            false,
            &mut errors,
        );
        let avatar_format =
            InputValidator::image("avatar", form.avatar.as_ref(), false, &mut errors);

        if !errors.has("username")
            && self.users.username_taken(&username, Some(user_id)).await?
        {
            errors.add("username", USERNAME_TAKEN);
        }
        errors.into_result()?;

        let new_avatar = match form.avatar.as_ref().zip(avatar_format) {
            Some((upload, format)) => Some(self.media.save(AVATAR_DIR, upload, format).await?),
            None => None,
        };

        let changes = ProfileChanges {
            username,
            email,
            first_name,
            last_name,
            avatar: new_avatar.clone(),
            bio: normalize_bio(form.bio.as_deref()),
        };

        match self.users.update_profile(user_id, &changes).await {
            Ok(updated) => {
                if new_avatar.is_some() {
                    self.media.remove(&current.profile.avatar).await;
                }
                tracing::info!(user_id = %user_id, "Profile updated");
                Ok(updated)
            }
            Err(e) => {
                if let Some(path) = &new_avatar {
                    self.media.remove(path).await;
                }
                Err(map_username_conflict(e))
            }
        }
    }

    pub async fn delete(&self, user_id: Uuid) -> Result<(), AppError> {
        let current = self.show(user_id).await?;
        if !self.users.delete(user_id).await? {
            return Err(AppError::NotFound);
        }
        self.media.remove(&current.profile.avatar).await;
        tracing::info!(user_id = %user_id, "Account deleted");
        Ok(())
    }
}

fn normalize_bio(bio: Option<&str>) -> Option<String> {
    bio.map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
}

fn required(field: &str) -> AppError {
    let mut errors = FieldErrors::new();
    errors.add(field, "This field is required.");
    AppError::Validation(errors)
}

fn map_username_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            AppError::Validation(errors)
        }
        _ => err.into(),
    }
}
