pub mod database;
pub mod redis;
pub mod settings;

pub use settings::Settings;
