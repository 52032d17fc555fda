pub mod db;
pub mod media;
pub mod security;
