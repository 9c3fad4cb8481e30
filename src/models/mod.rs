//! Data models for the air quality widget
//!
//! This module contains the core domain models organized by concern:
//! - Location: validated location queries
//! - Reading: an AQI value paired with its presentation

pub mod location;
pub mod reading;

// Re-export all public types for convenient access
pub use location::LocationQuery;
pub use reading::AqiReading;
