//! # Respirar
//!
//! Air Quality Index prediction from pollutant concentrations, served over HTTP.
//!
//! Respirar (Spanish: "to breathe") turns nine pollutant readings into a single
//! AQI estimate and a health category. A fitted scaler and a random-forest
//! regressor are loaded from artifact files at startup; the server exposes an
//! HTML input form and a JSON API on top of the same pipeline.
//!
//! ## Features
//!
//! - **Fixed schema**: Nine-pollutant feature vector (PM2.5 through O3)
//! - **Standard scaling**: Offline-fitted mean/std parameters, applied per request
//! - **Forest regression**: Averaged decision-tree ensemble in the AQR format
//! - **Health buckets**: Six categories from Good to Severe, with advisories
//! - **Degraded mode**: Missing artifacts disable predictions, never the process
//!
//! ## Example
//!
//! ```rust
//! use respirar::{FormState, Predictor};
//!
//! let predictor = Predictor::demo();
//! let prediction = predictor.handle(&FormState::default()).unwrap();
//!
//! assert!(prediction.aqi.is_finite());
//! println!("{} ({})", prediction.formatted_aqi(), prediction.bucket.label());
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

// Clippy allows (MUST come after deny/warn to override them)
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)] // usize -> f32 precision loss is acceptable
#![allow(clippy::cast_possible_truncation)] // u128 -> u64 etc for metrics is safe
#![allow(clippy::must_use_candidate)] // Not all methods need #[must_use]
#![allow(clippy::missing_panics_doc)] // Allow missing Panics doc sections
#![allow(clippy::doc_markdown)] // Allow technical terms without backticks
#![allow(clippy::float_cmp)] // Allow float comparisons in tests
#![allow(clippy::too_many_lines)] // Some handlers are naturally long
#![allow(clippy::uninlined_format_args)] // Prefer explicit format args

#[cfg(feature = "server")]
pub mod api;
/// AQR artifact format (header parsing, load/save, startup state)
pub mod artifact;
pub mod bucket;
/// CLI command implementations (extracted for testability)
pub mod cli;
pub mod error;
pub mod forest;
pub mod form;
#[cfg(feature = "server")]
pub mod metrics;
pub mod pipeline;
pub mod scaler;
pub mod traits;

// Re-exports for convenience
pub use bucket::AqiBucket;
pub use error::{RespirarError, Result};
pub use form::FormState;
pub use pipeline::{Prediction, Predictor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        // VERSION is a compile-time constant from CARGO_PKG_VERSION, so it's never empty
        assert!(VERSION.starts_with("0."));
        assert!(VERSION.len() >= 3); // At least "0.x"
        assert!(VERSION.contains('.'));
    }
}
