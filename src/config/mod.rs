/// Database configuration and connection management
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

/// Discord user to household profile mapping from environment variables
pub mod users;
