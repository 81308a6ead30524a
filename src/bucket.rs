//! AQI health-category buckets
//!
//! Maps a predicted AQI scalar onto the six-tier Indian CPCB category
//! scale. Classification is a pure threshold chain with no side effects.

use std::fmt;

/// Advisory shown when air quality reaches hazardous levels
pub const ADVISORY: &str = "High pollution levels detected. Stay indoors and use air purifiers.";

/// Health category for a predicted AQI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiBucket {
    /// AQI up to 50
    Good,
    /// AQI up to 100
    Satisfactory,
    /// AQI up to 200
    Moderate,
    /// AQI up to 300
    Poor,
    /// AQI up to 400
    VeryPoor,
    /// AQI above 400
    Severe,
}

impl AqiBucket {
    /// Classify an AQI value into its health category.
    ///
    /// Each bound is inclusive on the low side of the next category, so
    /// 50.0 is `Good` and 50.1 is `Satisfactory`. NaN fails every bound
    /// check and lands in `Severe`.
    ///
    /// # Examples
    ///
    /// ```
    /// use respirar::bucket::AqiBucket;
    ///
    /// assert_eq!(AqiBucket::classify(42.0), AqiBucket::Good);
    /// assert_eq!(AqiBucket::classify(275.0), AqiBucket::Poor);
    /// ```
    #[must_use]
    pub fn classify(aqi: f32) -> Self {
        if aqi <= 50.0 {
            AqiBucket::Good
        } else if aqi <= 100.0 {
            AqiBucket::Satisfactory
        } else if aqi <= 200.0 {
            AqiBucket::Moderate
        } else if aqi <= 300.0 {
            AqiBucket::Poor
        } else if aqi <= 400.0 {
            AqiBucket::VeryPoor
        } else {
            AqiBucket::Severe
        }
    }

    /// Display label for this category
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            AqiBucket::Good => "Good",
            AqiBucket::Satisfactory => "Satisfactory",
            AqiBucket::Moderate => "Moderate",
            AqiBucket::Poor => "Poor",
            AqiBucket::VeryPoor => "Very Poor",
            AqiBucket::Severe => "Severe",
        }
    }

    /// Display color for this category as a CSS hex string
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            AqiBucket::Good => "#00e400",
            AqiBucket::Satisfactory => "#ffff00",
            AqiBucket::Moderate => "#ff7e00",
            AqiBucket::Poor => "#ff0000",
            AqiBucket::VeryPoor => "#8f3f97",
            AqiBucket::Severe => "#7e0023",
        }
    }

    /// Whether this category triggers the stay-indoors advisory
    #[must_use]
    pub const fn is_hazardous(self) -> bool {
        matches!(self, AqiBucket::VeryPoor | AqiBucket::Severe)
    }

    /// All categories in ascending severity order
    #[must_use]
    pub const fn all() -> [AqiBucket; 6] {
        [
            AqiBucket::Good,
            AqiBucket::Satisfactory,
            AqiBucket::Moderate,
            AqiBucket::Poor,
            AqiBucket::VeryPoor,
            AqiBucket::Severe,
        ]
    }
}

impl fmt::Display for AqiBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
