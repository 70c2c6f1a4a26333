// BP Tracker Data
// This crate handles persistence through a key-value adapter

// Database connection management
#[cfg(feature = "sqlite")]
pub mod database;

// Key-value storage implementations
pub mod storage;

// Serialized storage models
pub mod models;
