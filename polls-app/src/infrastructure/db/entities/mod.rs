pub mod choice;
pub mod question;
pub mod user;
pub mod user_profile;
pub mod vote;

pub use choice::Entity as Choice;
pub use question::Entity as Question;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
pub use vote::Entity as Vote;
