pub mod app_metadata;
pub mod user_metadata;
