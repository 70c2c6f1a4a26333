// Domain entities and value objects
pub mod category;
pub mod conversions;
pub mod reading;
pub mod settings;

// Re-export common types for easier imports
pub use category::{category_legend, BloodPressureCategory, Classification, LegendEntry, DISCLAIMER};
pub use reading::{NewReading, Reading};
pub use settings::{Capabilities, Settings};
