pub mod analyze;
pub mod config;
pub mod exercises;
pub mod history;
pub mod profile;
pub mod session;
