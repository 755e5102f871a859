// Core business logic module

pub mod cluster;
pub mod config;

// Re-export commonly used items
pub use config::Config;
