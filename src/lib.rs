//! User-account backend: peppered bcrypt credentials, case-insensitive
//! identity uniqueness, partial updates, migrations and email plumbing.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod mailer;
pub mod migrations;
pub mod password;
pub mod routes;
pub mod state;
pub mod users;
