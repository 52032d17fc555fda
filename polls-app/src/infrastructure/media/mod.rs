mod media_store;

pub use media_store::{MediaStore, AVATAR_DIR, QUESTION_IMAGE_DIR};
