//! `aqi-widget` - Air quality index lookup widget
//!
//! This library provides the categorization of AQI values into health
//! categories, a simulated asynchronous AQI data source, and the widget that
//! ties a lookup to a display.

pub mod category;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod source;
pub mod telemetry;
pub mod widget;

// Re-export core types for public API
pub use category::{AqiCategory, Categorizer, CategoryBand, OutOfRangePolicy, Presentation};
pub use config::{AirQualityConfig, SimulationConfig};
pub use display::{DisplayFrame, DisplaySink, MemoryDisplay, Severity, StatusLine, TerminalDisplay};
pub use error::AirQualityError;
pub use models::{AqiReading, LocationQuery};
pub use source::{AqiSource, DelaySource, RandomSource, SimulatedSource};
pub use widget::{AqiWidget, RequestState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirQualityError>;
