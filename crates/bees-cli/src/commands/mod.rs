pub mod config;
pub mod hive;
pub mod up;
