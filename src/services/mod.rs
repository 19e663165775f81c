pub mod assistant;
pub mod conversation;
pub mod intent;
pub mod llm;
pub mod stripe;
pub mod token;
pub mod translator;
