pub mod cache;
pub mod guard;
