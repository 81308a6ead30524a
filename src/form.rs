//! Input form schema for the nine pollutant readings
//!
//! The field order here is the contract with the trained artifacts: the
//! feature vector is assembled in exactly this order, matching the column
//! order the scaler and model were fitted on.

use serde::{Deserialize, Serialize};

/// Number of pollutant features the pipeline operates on
pub const NUM_FEATURES: usize = 9;

/// Lower bound for every pollutant input
pub const MIN_VALUE: f32 = 0.0;

/// Static description of one pollutant input field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollutantField {
    /// Machine name, used as form key and CLI flag
    pub name: &'static str,
    /// Human-readable label with measurement unit
    pub label: &'static str,
    /// Value prefilled before the user edits anything
    pub default: f32,
    /// Increment used by spinner controls
    pub step: f32,
}

/// The nine pollutant fields, in feature-vector order
pub const FIELDS: [PollutantField; NUM_FEATURES] = [
    PollutantField {
        name: "pm25",
        label: "PM2.5 (µg/m³)",
        default: 60.0,
        step: 1.0,
    },
    PollutantField {
        name: "pm10",
        label: "PM10 (µg/m³)",
        default: 100.0,
        step: 1.0,
    },
    PollutantField {
        name: "no",
        label: "NO (µg/m³)",
        default: 2.5,
        step: 0.1,
    },
    PollutantField {
        name: "no2",
        label: "NO2 (µg/m³)",
        default: 30.0,
        step: 0.1,
    },
    PollutantField {
        name: "nox",
        label: "NOx (µg/m³)",
        default: 18.0,
        step: 0.1,
    },
    PollutantField {
        name: "nh3",
        label: "NH3 (µg/m³)",
        default: 8.5,
        step: 0.1,
    },
    PollutantField {
        name: "co",
        label: "CO (mg/m³)",
        default: 0.1,
        step: 0.01,
    },
    PollutantField {
        name: "so2",
        label: "SO2 (µg/m³)",
        default: 12.0,
        step: 0.1,
    },
    PollutantField {
        name: "o3",
        label: "O3 (µg/m³)",
        default: 125.0,
        step: 1.0,
    },
];

/// Machine names of the nine fields, in feature-vector order
#[must_use]
pub fn feature_names() -> [&'static str; NUM_FEATURES] {
    let mut names = [""; NUM_FEATURES];
    for (slot, field) in names.iter_mut().zip(FIELDS.iter()) {
        *slot = field.name;
    }
    names
}

/// One complete set of pollutant readings entered by the user.
///
/// Missing fields deserialize to the same defaults the form prefills.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    /// Fine particulate matter
    pub pm25: f32,
    /// Coarse particulate matter
    pub pm10: f32,
    /// Nitric oxide
    pub no: f32,
    /// Nitrogen dioxide
    pub no2: f32,
    /// Total nitrogen oxides
    pub nox: f32,
    /// Ammonia
    pub nh3: f32,
    /// Carbon monoxide
    pub co: f32,
    /// Sulphur dioxide
    pub so2: f32,
    /// Ozone
    pub o3: f32,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            pm25: FIELDS[0].default,
            pm10: FIELDS[1].default,
            no: FIELDS[2].default,
            no2: FIELDS[3].default,
            nox: FIELDS[4].default,
            nh3: FIELDS[5].default,
            co: FIELDS[6].default,
            so2: FIELDS[7].default,
            o3: FIELDS[8].default,
        }
    }
}

impl FormState {
    /// Assemble the feature vector in the canonical order.
    #[must_use]
    pub fn feature_vector(&self) -> [f32; NUM_FEATURES] {
        [
            self.pm25, self.pm10, self.no, self.no2, self.nox, self.nh3, self.co, self.so2,
            self.o3,
        ]
    }

    /// Value of the field at position `index` in the canonical order.
    #[must_use]
    pub fn value_at(&self, index: usize) -> f32 {
        self.feature_vector()[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_count_matches_vector_width() {
        assert_eq!(FIELDS.len(), NUM_FEATURES);
        assert_eq!(FormState::default().feature_vector().len(), NUM_FEATURES);
    }

    #[test]
    fn test_default_vector_matches_field_table() {
        let vector = FormState::default().feature_vector();
        for (value, field) in vector.iter().zip(FIELDS.iter()) {
            assert_eq!(*value, field.default, "default mismatch for {}", field.name);
        }
    }

    #[test]
    fn test_canonical_order() {
        let names = feature_names();
        assert_eq!(
            names,
            ["pm25", "pm10", "no", "no2", "nox", "nh3", "co", "so2", "o3"]
        );
    }

    #[test]
    fn test_feature_vector_order() {
        let form = FormState {
            pm25: 1.0,
            pm10: 2.0,
            no: 3.0,
            no2: 4.0,
            nox: 5.0,
            nh3: 6.0,
            co: 7.0,
            so2: 8.0,
            o3: 9.0,
        };
        assert_eq!(
            form.feature_vector(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]
        );
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let form: FormState = serde_json::from_str(r#"{"pm25": 80.0}"#).unwrap();
        assert_eq!(form.pm25, 80.0);
        assert_eq!(form.pm10, FIELDS[1].default);
        assert_eq!(form.o3, FIELDS[8].default);
    }

    #[test]
    fn test_value_at_follows_order() {
        let form = FormState::default();
        for (i, field) in FIELDS.iter().enumerate() {
            assert_eq!(form.value_at(i), field.default, "index {i}");
        }
    }

    #[test]
    fn test_labels_carry_units() {
        for field in &FIELDS {
            assert!(
                field.label.contains('('),
                "label missing unit: {}",
                field.label
            );
        }
        assert_eq!(FIELDS[0].label, "PM2.5 (µg/m³)");
        assert_eq!(FIELDS[6].label, "CO (mg/m³)");
    }
}
