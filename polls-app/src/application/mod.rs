mod accounts;
mod author_questions;
mod browse_questions;
mod cast_vote;

pub use accounts::{Authenticate, ManageProfile, RegisterUser};
pub use author_questions::{AuthorQuestions, AuthoringTemplate};
pub use browse_questions::BrowseQuestions;
pub use cast_vote::CastVote;
