pub mod app;
pub mod pages;
