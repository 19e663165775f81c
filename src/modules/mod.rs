pub mod auth;
pub mod billing;
pub mod catalog;
pub mod chat;
pub mod subscription;
pub mod translation;
pub mod users;
