//! Error types and handling for the air quality widget

use thiserror::Error;

/// Main error type for the air quality widget
#[derive(Error, Debug)]
pub enum AirQualityError {
    /// Input validation errors, raised before any lookup starts
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The data source has no readings for this location
    #[error("No data is available for {location}")]
    NoData { location: String },

    /// Generic lookup failure reported by the data source
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// A request is already in flight
    #[error("A request is already in progress")]
    Busy,

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AirQualityError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new "no data" error for a location
    pub fn no_data<S: Into<String>>(location: S) -> Self {
        Self::NoData {
            location: location.into(),
        }
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AirQualityError::Validation { message } | AirQualityError::Fetch { message } => {
                message.clone()
            }
            AirQualityError::NoData { location } => {
                format!("Simulated error: No data is available for {location}.")
            }
            AirQualityError::Busy => {
                "A lookup is already running. Please wait for it to finish.".to_string()
            }
            AirQualityError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            AirQualityError::Io { .. } => {
                "Terminal I/O failed. Please check that the output is writable.".to_string()
            }
        }
    }
}
