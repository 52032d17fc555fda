use crate::domain::Upload;
use chrono::{DateTime, NaiveDateTime, Utc};
use polls_errors::FieldErrors;
use regex::Regex;
use std::sync::OnceLock;

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const NAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const QUESTION_TEXT_MAX_LENGTH: usize = 200;
pub const SHORT_DESCRIPTION_MAX_LENGTH: usize = 255;
pub const CHOICE_TEXT_MAX_LENGTH: usize = 200;
pub const PASSWORD_MIN_LENGTH: usize = 8;

const REQUIRED: &str = "This field is required.";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

fn username_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern compiles"))
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern compiles")
    })
}

/// Formats accepted for avatars and question images, detected from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

pub struct InputValidator;

impl InputValidator {
    /// Trimmed text, checked for presence and length.
    pub fn text(
        field: &str,
        value: &str,
        max_len: usize,
        required: bool,
        errors: &mut FieldErrors,
    ) -> String {
        let value = value.trim();
        if required && value.is_empty() {
            errors.add(field, REQUIRED);
        }
        let len = value.chars().count();
        if len > max_len {
            errors.add(
                field,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max_len, len
                ),
            );
        }
        value.to_string()
    }

    pub fn username(value: &str, errors: &mut FieldErrors) -> String {
        let username = Self::text("username", value, USERNAME_MAX_LENGTH, true, errors);
        if !username.is_empty() && !username_pattern().is_match(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        username
    }

    pub fn email(value: &str, errors: &mut FieldErrors) -> String {
        let email = Self::text("email", value, EMAIL_MAX_LENGTH, true, errors);
        if !email.is_empty() && !email_pattern().is_match(&email) {
            errors.add("email", "Enter a valid email address.");
        }
        email
    }

    pub fn passwords(username: &str, password1: &str, password2: &str, errors: &mut FieldErrors) {
        if password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if password2.is_empty() {
            errors.add("password2", REQUIRED);
        }
        if password1.is_empty() || password2.is_empty() {
            return;
        }

        if password1 != password2 {
            errors.add("password2", "The two password fields didn't match.");
            return;
        }

        if password1.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password2",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    PASSWORD_MIN_LENGTH
                ),
            );
        }
        if password1.chars().all(|c| c.is_ascii_digit()) {
            errors.add("password2", "This password is entirely numeric.");
        }
        if !username.is_empty() && password1.eq_ignore_ascii_case(username) {
            errors.add("password2", "The password is too similar to the username.");
        }
    }

    pub fn image(
        field: &str,
        upload: Option<&Upload>,
        required: bool,
        errors: &mut FieldErrors,
    ) -> Option<ImageFormat> {
        let Some(upload) = upload.filter(|u| !u.bytes.is_empty()) else {
            if required {
                errors.add(field, REQUIRED);
            }
            return None;
        };

        match ImageFormat::sniff(&upload.bytes) {
            Some(format) => Some(format),
            None => {
                tracing::warn!(
                    field,
                    file_name = %upload.file_name,
                    "Rejected upload that is not a supported image"
                );
                errors.add(
                    field,
                    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
                );
                None
            }
        }
    }

    /// Accepts `datetime-local` input (read as UTC) or RFC 3339.
    pub fn datetime(field: &str, value: &str, errors: &mut FieldErrors) -> Option<DateTime<Utc>> {
        let value = value.trim();
        if value.is_empty() {
            errors.add(field, REQUIRED);
            return None;
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(parsed.with_timezone(&Utc));
        }

        let naive = DATETIME_INPUT_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok());
        match naive {
            Some(naive) => Some(naive.and_utc()),
            None => {
                errors.add(field, "Enter a valid date/time.");
                None
            }
        }
    }

    /// `None` for an absent or unparseable choice identifier.
    pub fn choice_id(raw: Option<&str>) -> Option<uuid::Uuid> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| uuid::Uuid::parse_str(s).ok())
    }
}
