mod input_validator;
mod password;
mod rate_limiter;

pub use input_validator::{
    ImageFormat, InputValidator, CHOICE_TEXT_MAX_LENGTH, NAME_MAX_LENGTH,
    QUESTION_TEXT_MAX_LENGTH, SHORT_DESCRIPTION_MAX_LENGTH,
};
pub use password::PasswordHasher;
pub use rate_limiter::{RateLimitError, RateLimiter};
