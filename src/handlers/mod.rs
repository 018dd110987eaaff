pub mod admin;
pub mod auth;
pub mod devices;
pub mod fallback;
pub mod health;
pub mod questions;
pub mod users;
