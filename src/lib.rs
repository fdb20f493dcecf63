// Public API for integration tests and potential library usage

pub mod answers;
pub mod api;
pub mod auth;
pub mod config;
pub mod engine;
pub mod history;
pub mod linguistics;
pub mod matcher;
pub mod questions;
pub mod text;
pub mod types;
