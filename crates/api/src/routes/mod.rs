//! HTTP route handlers.

pub mod auth;
pub mod dashboard;
pub mod dispatch;
pub mod email_log;
pub mod health;
pub mod settings;
pub mod users;
