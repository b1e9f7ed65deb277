pub mod config;
pub mod exercises;
pub mod history;
pub mod log;
pub mod open;
pub mod remove;
