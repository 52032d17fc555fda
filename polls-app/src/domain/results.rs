use super::{Choice, Question};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceTally {
    pub choice_id: uuid::Uuid,
    pub choice_text: String,
    pub votes: i32,
    pub percentage: f64,
}

/// Tallies for one question, recomputed from the current rows on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResults {
    pub question: Question,
    pub choices: Vec<ChoiceTally>,
    pub total_votes: i64,
}

impl PollResults {
    pub fn compute(question: Question, choices: Vec<Choice>) -> Self {
        let total_votes: i64 = choices.iter().map(|c| i64::from(c.votes)).sum();

        let choices = choices
            .into_iter()
            .map(|c| ChoiceTally {
                percentage: percentage(c.votes, total_votes),
                choice_id: c.id,
                choice_text: c.choice_text,
                votes: c.votes,
            })
            .collect();

        Self {
            question,
            choices,
            total_votes,
        }
    }

    pub fn percentage_of(&self, choice_id: uuid::Uuid) -> Option<f64> {
        self.choices
            .iter()
            .find(|c| c.choice_id == choice_id)
            .map(|c| c.percentage)
    }
}

/// Share of `total`, rounded half-to-even to two decimals; zero when nobody voted.
fn percentage(votes: i32, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = f64::from(votes) / total as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}
