//! Location query model for air quality lookups

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AirQualityError;

/// A validated location query: trimmed and never empty
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct LocationQuery {
    name: String,
}

impl LocationQuery {
    /// Parse raw user input into a location query.
    ///
    /// Surrounding whitespace is removed. Input that is empty after trimming
    /// is rejected with a validation error.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let name = input.trim();
        if name.is_empty() {
            return Err(AirQualityError::validation("Please enter a location."));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// The location as entered, minus surrounding whitespace
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-folded form used for deny-list matching
    #[must_use]
    pub fn normalized(&self) -> String {
        self.name.to_lowercase()
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TryFrom<String> for LocationQuery {
    type Error = AirQualityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LocationQuery> for String {
    fn from(value: LocationQuery) -> Self {
        value.name
    }
}
