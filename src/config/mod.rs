/// Agency configuration loading from config.toml and catalog seeding
pub mod agency;

/// Database configuration and connection management
pub mod database;

/// Super admin bootstrap from environment variables
pub mod users;
