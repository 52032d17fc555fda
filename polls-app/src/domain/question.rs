use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A question counts as recently published for this long after `pub_date`.
pub const RECENT_WINDOW_HOURS: i64 = 24;

/// Time-derived state of a question. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionState {
    Active,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: uuid::Uuid,
    pub question_text: String,
    pub short_description: String,
    pub description: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
}

impl Question {
    pub fn new(
        question_text: String,
        short_description: String,
        description: String,
        image: Option<String>,
        pub_date: DateTime<Utc>,
        expiration_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            question_text,
            short_description,
            description,
            image,
            pub_date,
            expiration_date,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now <= self.expiration_date
    }

    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        self.pub_date >= now - Duration::hours(RECENT_WINDOW_HOURS)
    }

    pub fn state(&self, now: DateTime<Utc>) -> QuestionState {
        if self.is_active(now) {
            QuestionState::Active
        } else {
            QuestionState::Expired
        }
    }

    /// Administrators see every question; everybody else only active ones.
    pub fn is_visible_to(&self, is_admin: bool, now: DateTime<Utc>) -> bool {
        is_admin || self.is_active(now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: uuid::Uuid,
    pub question_id: uuid::Uuid,
    pub choice_text: String,
    pub votes: i32,
    pub display_order: i32,
}

impl Choice {
    pub fn new(question_id: uuid::Uuid, choice_text: String, display_order: i32) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            question_id,
            choice_text,
            votes: 0,
            display_order,
        }
    }
}

/// One row of the question listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub id: uuid::Uuid,
    pub question_text: String,
    pub short_description: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub state: QuestionState,
    pub recently_published: bool,
}

impl QuestionSummary {
    pub fn from_question(question: Question, now: DateTime<Utc>) -> Self {
        let state = question.state(now);
        let recently_published = question.was_published_recently(now);
        Self {
            id: question.id,
            question_text: question.question_text,
            short_description: question.short_description,
            image: question.image,
            pub_date: question.pub_date,
            expiration_date: question.expiration_date,
            state,
            recently_published,
        }
    }
}

/// Question with its choices, as shown on the voting page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub question: Question,
    pub choices: Vec<Choice>,
    pub state: QuestionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl QuestionDetail {
    pub fn new(question: Question, choices: Vec<Choice>, now: DateTime<Utc>) -> Self {
        let state = question.state(now);
        Self {
            question,
            choices,
            state,
            error_message: None,
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_expiring_at(pub_date: DateTime<Utc>, expiration_date: DateTime<Utc>) -> Question {
        Question::new(
            "What's new?".to_string(),
            "Short".to_string(),
            String::new(),
            None,
            pub_date,
            expiration_date,
        )
    }

    #[test]
    fn test_active_until_expiration_inclusive() {
        let now = Utc::now();
        let q = question_expiring_at(now - Duration::days(2), now);
        assert!(q.is_active(now));
        assert_eq!(q.state(now), QuestionState::Active);
        assert!(!q.is_active(now + Duration::seconds(1)));
        assert_eq!(q.state(now + Duration::seconds(1)), QuestionState::Expired);
    }

    #[test]
    fn test_expired_question_visible_only_to_admin() {
        let now = Utc::now();
        let q = question_expiring_at(now - Duration::days(3), now - Duration::days(1));
        assert!(!q.is_visible_to(false, now));
        assert!(q.is_visible_to(true, now));
    }

    #[test]
    fn test_was_published_recently() {
        let now = Utc::now();
        let fresh = question_expiring_at(now - Duration::hours(23), now + Duration::days(1));
        let old = question_expiring_at(
            now - Duration::hours(24) - Duration::seconds(1),
            now + Duration::days(1),
        );
        assert!(fresh.was_published_recently(now));
        assert!(!old.was_published_recently(now));
    }

    #[test]
    fn test_summary_carries_derived_flags() {
        let now = Utc::now();
        let q = question_expiring_at(now - Duration::days(5), now - Duration::days(1));
        let summary = QuestionSummary::from_question(q, now);
        assert_eq!(summary.state, QuestionState::Expired);
        assert!(!summary.recently_published);
    }
}
