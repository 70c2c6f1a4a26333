// BP Tracker Domain
// This crate contains the business logic for the blood pressure tracker

// Services that implement business logic
pub mod services;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the storage module from the data crate for convenience
pub use bp_tracker_data::storage;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
