pub mod api;
pub mod downloads;
pub mod pages;
pub mod uploads;
