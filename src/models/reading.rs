//! A fetched AQI value together with how it should be shown

use serde::{Deserialize, Serialize};

use crate::category::{AqiCategory, Presentation};
use crate::models::LocationQuery;

/// Result of a successful lookup
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AqiReading {
    /// Location the value was fetched for
    pub location: LocationQuery,
    /// Air Quality Index value
    pub aqi: i32,
    /// Color, style tag and advice for `aqi`
    pub presentation: Presentation,
}

impl AqiReading {
    #[must_use]
    pub fn category(&self) -> Option<AqiCategory> {
        self.presentation.category
    }

    /// One-line summary, e.g. `Berlin: AQI 42 (Good)`
    #[must_use]
    pub fn summary(&self) -> String {
        match self.presentation.category {
            Some(category) => format!("{}: AQI {} ({category})", self.location, self.aqi),
            None => format!("{}: AQI {}", self.location, self.aqi),
        }
    }
}
