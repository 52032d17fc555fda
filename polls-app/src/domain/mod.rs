mod forms;
mod question;
mod results;
mod user;
mod vote;

pub use forms::{
    ChoiceInput, LoginForm, ProfileEditForm, QuestionForm, RegistrationForm, Upload,
    DEFAULT_CHOICE_SLOTS,
};
pub use question::{Choice, Question, QuestionDetail, QuestionState, QuestionSummary};
pub use results::{ChoiceTally, PollResults};
pub use user::{Profile, User, UserProfile};
pub use vote::VoteReceipt;
