// Public entities for the BP tracker API
// This module contains data structures that are shared across the application boundary

// Reading requests and responses
pub mod reading;

// Settings payloads
pub mod settings;

// Common entities for error handling
pub mod common;
