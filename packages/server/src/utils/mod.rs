pub mod filename;
pub mod version;
