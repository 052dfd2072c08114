pub mod connection;
pub mod migration_runner;
pub mod settings;
pub mod trades;

pub use connection::Database;
