pub mod error;
pub mod stage;
pub mod types;
