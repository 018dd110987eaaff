pub mod device_store;
pub mod key_store;
pub mod question_store;
pub mod user_store;
