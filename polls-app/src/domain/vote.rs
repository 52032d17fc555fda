use serde::{Deserialize, Serialize};

/// Result of a successful vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub question_id: uuid::Uuid,
    pub choice_id: uuid::Uuid,
    pub new_tally: i32,
}
