//! AQI categorization
//!
//! Maps a numeric Air Quality Index to the band it falls in and the
//! presentation that goes with it: display color, style tag and health advice.
//! Bands are scanned in ascending threshold order; upper bounds are inclusive,
//! so 50 is still `Good` and 51 is `Moderate`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AirQualityError;

/// Largest AQI value the standard scale treats as in range.
pub const NOMINAL_MAX_AQI: i32 = 300;

/// Color used when no category applies
pub const UNKNOWN_COLOR: &str = "#6b7280";

/// Advice used when no category applies
pub const UNKNOWN_ADVICE: &str = "Could not determine health advice for this AQI value.";

/// AQI categories, ordered from cleanest to most polluted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    /// 0-50
    Good,
    /// 51-100
    Moderate,
    /// 101-150
    UnhealthyForSensitiveGroups,
    /// 151-200
    Unhealthy,
    /// 201-300
    VeryUnhealthy,
    /// Above 300
    Hazardous,
}

impl AqiCategory {
    /// All categories in ascending severity
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Moderate,
        AqiCategory::UnhealthyForSensitiveGroups,
        AqiCategory::Unhealthy,
        AqiCategory::VeryUnhealthy,
        AqiCategory::Hazardous,
    ];

    /// Category for a value on the standard scale, negative values
    /// counting as `Good`
    #[must_use]
    pub fn for_value(aqi: i32) -> Self {
        match aqi {
            i32::MIN..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }

    /// The standard band describing this category
    #[must_use]
    pub fn band(self) -> CategoryBand {
        let (upper, color, style_tag, advice) = match self {
            AqiCategory::Good => (
                Some(50),
                "#28a745",
                "aqi-good",
                "Air quality is good. It's a great day for outdoor activities. No precautions are needed.",
            ),
            AqiCategory::Moderate => (
                Some(100),
                "#ffc107",
                "aqi-moderate",
                "Air quality is acceptable. Unusually sensitive individuals should consider limiting prolonged outdoor exertion.",
            ),
            AqiCategory::UnhealthyForSensitiveGroups => (
                Some(150),
                "#fd7e14",
                "aqi-unhealthy-sensitive",
                "Unhealthy for sensitive groups (e.g., people with lung disease, older adults, children). These groups should reduce prolonged outdoor exertion.",
            ),
            AqiCategory::Unhealthy => (
                Some(200),
                "#dc3545",
                "aqi-unhealthy",
                "Unhealthy for everyone. Sensitive groups should avoid all outdoor exertion. Everyone else should reduce prolonged or heavy outdoor exertion.",
            ),
            AqiCategory::VeryUnhealthy => (
                Some(300),
                "#6f42c1",
                "aqi-very-unhealthy",
                "Very unhealthy. Sensitive groups should remain indoors. Everyone else should avoid all outdoor exertion. Wear a mask if you must go outside.",
            ),
            AqiCategory::Hazardous => (
                None,
                "#701a28",
                "aqi-hazardous",
                "Hazardous. Everyone should avoid all outdoor physical activity. Remain indoors and keep activity levels low.",
            ),
        };
        CategoryBand {
            category: self,
            upper,
            color: color.to_string(),
            style_tag: style_tag.to_string(),
            advice: advice.to_string(),
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiCategory::Good => write!(f, "Good"),
            AqiCategory::Moderate => write!(f, "Moderate"),
            AqiCategory::UnhealthyForSensitiveGroups => {
                write!(f, "Unhealthy for Sensitive Groups")
            }
            AqiCategory::Unhealthy => write!(f, "Unhealthy"),
            AqiCategory::VeryUnhealthy => write!(f, "Very Unhealthy"),
            AqiCategory::Hazardous => write!(f, "Hazardous"),
        }
    }
}

/// One row of the category table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBand {
    /// Category this band represents
    pub category: AqiCategory,
    /// Inclusive upper threshold, `None` for the unbounded last band
    pub upper: Option<i32>,
    /// Display color as a `#rrggbb` string
    pub color: String,
    /// Style tag (CSS class) for the advice box
    pub style_tag: String,
    /// Health advice text
    pub advice: String,
}

impl CategoryBand {
    fn contains_upto(&self, aqi: i32) -> bool {
        self.upper.is_none_or(|upper| aqi <= upper)
    }
}

/// How values outside the nominal 0..=300 scale are categorized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Plain threshold scan: negatives land in the lowest band, anything
    /// above the last bounded threshold in the catch-all band
    #[default]
    ThresholdScan,
    /// Values below zero or above the nominal maximum get the unknown
    /// presentation
    Unexpected,
}

impl fmt::Display for OutOfRangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutOfRangePolicy::ThresholdScan => write!(f, "threshold_scan"),
            OutOfRangePolicy::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// What the display shows for an AQI value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Matched category, `None` when the value could not be categorized
    pub category: Option<AqiCategory>,
    pub color: String,
    pub style_tag: String,
    pub advice: String,
}

impl Presentation {
    /// Fallback presentation for values no band accepts
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            category: None,
            color: UNKNOWN_COLOR.to_string(),
            style_tag: String::new(),
            advice: UNKNOWN_ADVICE.to_string(),
        }
    }

    /// Whether this is the fallback presentation
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.category.is_none()
    }
}

impl From<&CategoryBand> for Presentation {
    fn from(band: &CategoryBand) -> Self {
        Self {
            category: Some(band.category),
            color: band.color.clone(),
            style_tag: band.style_tag.clone(),
            advice: band.advice.clone(),
        }
    }
}

/// Maps AQI values to presentations using an ordered band table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categorizer {
    bands: Vec<CategoryBand>,
    policy: OutOfRangePolicy,
}

impl Categorizer {
    /// Build a categorizer from a custom band table.
    ///
    /// Bounded thresholds must be strictly ascending and the last band, and
    /// only the last band, must be unbounded.
    pub fn new(bands: Vec<CategoryBand>, policy: OutOfRangePolicy) -> crate::Result<Self> {
        let Some((last, bounded)) = bands.split_last() else {
            return Err(AirQualityError::config("category table is empty"));
        };
        if last.upper.is_some() {
            return Err(AirQualityError::config(
                "the last category must have no upper threshold",
            ));
        }

        let mut previous: Option<i32> = None;
        for band in bounded {
            let Some(upper) = band.upper else {
                return Err(AirQualityError::config(format!(
                    "only the last category may be unbounded, but {} is",
                    band.category
                )));
            };
            if previous.is_some_and(|prev| upper <= prev) {
                return Err(AirQualityError::config(format!(
                    "category thresholds must be strictly ascending at {} ({upper})",
                    band.category
                )));
            }
            previous = Some(upper);
        }

        Ok(Self { bands, policy })
    }

    /// The standard six-band AQI scale
    #[must_use]
    pub fn standard(policy: OutOfRangePolicy) -> Self {
        Self {
            bands: AqiCategory::ALL.iter().map(|c| c.band()).collect(),
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> OutOfRangePolicy {
        self.policy
    }

    #[must_use]
    pub fn bands(&self) -> &[CategoryBand] {
        &self.bands
    }

    /// Largest in-range value: the highest bounded threshold
    fn nominal_max(&self) -> i32 {
        self.bands
            .iter()
            .filter_map(|band| band.upper)
            .max()
            .unwrap_or(NOMINAL_MAX_AQI)
    }

    /// Categorize an AQI value. Never fails; values no band accepts get
    /// [`Presentation::unknown`].
    #[must_use]
    pub fn categorize(&self, aqi: i32) -> Presentation {
        if self.policy == OutOfRangePolicy::Unexpected && !(0..=self.nominal_max()).contains(&aqi)
        {
            tracing::debug!(aqi, "AQI outside nominal range, using unknown presentation");
            return Presentation::unknown();
        }

        self.bands
            .iter()
            .find(|band| band.contains_upto(aqi))
            .map(Presentation::from)
            .unwrap_or_else(Presentation::unknown)
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::standard(OutOfRangePolicy::default())
    }
}
