pub mod activation;
pub mod api;
pub mod device;
pub mod question;
pub mod user;
