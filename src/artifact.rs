//! AQR artifact format: loading and saving fitted scaler/model pairs
//!
//! An artifact is a 32-byte binary header followed by a JSON payload:
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic "AQR\0"
//! 4       1     Format version major (currently 1)
//! 5       1     Format version minor (currently 0)
//! 6       2     Reserved
//! 8       2     Artifact kind (u16 LE): 1 = scaler, 2 = regressor
//! 10      2     Reserved
//! 12      4     Payload length (u32 LE)
//! 16      16    Reserved
//! 32      ...   JSON payload
//! ```
//!
//! Loading validates everything up front so a bad artifact surfaces at
//! startup, not on the first prediction.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RespirarError, Result};
use crate::forest::ForestRegressor;
use crate::form;
use crate::pipeline::Predictor;
use crate::scaler::StandardScaler;

/// Magic bytes at the start of every artifact
pub const MAGIC: [u8; 4] = *b"AQR\0";

/// Artifact header size in bytes
pub const HEADER_SIZE: usize = 32;

/// Format version written by this crate
pub const FORMAT_VERSION: (u8, u8) = (1, 0);

/// Default scaler artifact path
pub const DEFAULT_SCALER_PATH: &str = "aqi_scaler.aqr";

/// Default model artifact path
pub const DEFAULT_MODEL_PATH: &str = "aqi_model.aqr";

/// What an artifact file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Standardization parameters
    Scaler,
    /// Fitted forest regressor
    Regressor,
}

impl ArtifactKind {
    /// Wire encoding of this kind
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            ArtifactKind::Scaler => 1,
            ArtifactKind::Regressor => 2,
        }
    }

    /// Decode a kind from its wire value.
    #[must_use]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(ArtifactKind::Scaler),
            2 => Some(ArtifactKind::Regressor),
            _ => None,
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Regressor => "regressor",
        }
    }
}

/// Parsed artifact header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactHeader {
    /// Format version (major, minor)
    pub version: (u8, u8),
    /// What the payload contains
    pub kind: ArtifactKind,
    /// JSON payload length in bytes
    pub payload_len: u32,
}

impl ArtifactHeader {
    /// Parse and validate a header from the front of `data`.
    ///
    /// # Errors
    ///
    /// Returns `FormatError` if the data is shorter than the header,
    /// the magic or version is wrong, the kind is unknown, or the
    /// declared payload length disagrees with the data length.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(RespirarError::FormatError {
                reason: format!(
                    "file too small: {} bytes, header needs {HEADER_SIZE}",
                    data.len()
                ),
            });
        }
        if data[0..4] != MAGIC {
            return Err(RespirarError::FormatError {
                reason: format!("bad magic: {:02x?}", &data[0..4]),
            });
        }
        let version = (data[4], data[5]);
        if version.0 != FORMAT_VERSION.0 {
            return Err(RespirarError::FormatError {
                reason: format!(
                    "unsupported format version {}.{}, expected major {}",
                    version.0, version.1, FORMAT_VERSION.0
                ),
            });
        }
        let kind_raw = u16::from_le_bytes([data[8], data[9]]);
        let kind = ArtifactKind::from_u16(kind_raw).ok_or_else(|| RespirarError::FormatError {
            reason: format!("unknown artifact kind {kind_raw}"),
        })?;
        let payload_len = u32::from_le_bytes([data[12], data[13], data[14], data[15]]);
        let expected = HEADER_SIZE as u64 + u64::from(payload_len);
        if (data.len() as u64) < expected {
            return Err(RespirarError::FormatError {
                reason: format!(
                    "truncated payload: header declares {payload_len} bytes, file has {}",
                    data.len() - HEADER_SIZE
                ),
            });
        }
        Ok(Self {
            version,
            kind,
            payload_len,
        })
    }

    /// Serialize this header to its 32-byte wire form.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&MAGIC);
        bytes[4] = self.version.0;
        bytes[5] = self.version.1;
        bytes[8..10].copy_from_slice(&self.kind.as_u16().to_le_bytes());
        bytes[12..16].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }
}

/// Encode a payload into a complete artifact byte buffer.
///
/// # Errors
///
/// Returns `FormatError` if the payload fails to serialize or exceeds
/// the u32 length field.
pub fn encode_artifact<T: Serialize>(kind: ArtifactKind, payload: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(payload)?;
    let payload_len =
        u32::try_from(json.len()).map_err(|_| RespirarError::FormatError {
            reason: format!("payload too large: {} bytes", json.len()),
        })?;
    let header = ArtifactHeader {
        version: FORMAT_VERSION,
        kind,
        payload_len,
    };
    let mut bytes = Vec::with_capacity(HEADER_SIZE + json.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&json);
    Ok(bytes)
}

/// Decode an artifact buffer, checking it contains the expected kind.
///
/// # Errors
///
/// Returns `FormatError` on any header or payload problem, including a
/// kind mismatch (a model file passed where a scaler was expected).
pub fn decode_artifact<T: DeserializeOwned>(
    expected: ArtifactKind,
    data: &[u8],
) -> Result<(ArtifactHeader, T)> {
    let header = ArtifactHeader::from_bytes(data)?;
    if header.kind != expected {
        return Err(RespirarError::FormatError {
            reason: format!(
                "expected a {} artifact, found a {}",
                expected.describe(),
                header.kind.describe()
            ),
        });
    }
    let payload_end = HEADER_SIZE + header.payload_len as usize;
    let payload = serde_json::from_slice(&data[HEADER_SIZE..payload_end])?;
    Ok((header, payload))
}

fn read_artifact_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(RespirarError::ArtifactNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(fs::read(path)?)
}

/// Load a scaler artifact and validate it against the canonical schema.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, the parameters
/// fail structural checks, or the artifact was fitted on a different
/// feature set than the nine-pollutant form.
pub fn load_scaler(path: &Path) -> Result<StandardScaler> {
    let data = read_artifact_file(path)?;
    let (_, payload): (_, ScalerPayload) = decode_artifact(ArtifactKind::Scaler, &data)?;
    let scaler = StandardScaler::new(payload.feature_names, payload.mean, payload.std)?;
    validate_schema(scaler.feature_names())?;
    Ok(scaler)
}

/// Load a regressor artifact.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, or the forest
/// was fitted on a vector width other than the nine-pollutant form.
pub fn load_regressor(path: &Path) -> Result<ForestRegressor> {
    let data = read_artifact_file(path)?;
    let (_, payload): (_, RegressorPayload) = decode_artifact(ArtifactKind::Regressor, &data)?;
    let forest = ForestRegressor::new(payload.n_features, payload.trees)?;
    if forest.n_features() != form::NUM_FEATURES {
        return Err(RespirarError::FormatError {
            reason: format!(
                "regressor fitted on {} features, the form provides {}",
                forest.n_features(),
                form::NUM_FEATURES
            ),
        });
    }
    Ok(forest)
}

/// Write a scaler artifact to disk.
///
/// # Errors
///
/// Returns an error if encoding or the file write fails.
pub fn save_scaler(path: &Path, scaler: &StandardScaler) -> Result<()> {
    let payload = ScalerPayload {
        feature_names: scaler.feature_names().to_vec(),
        mean: scaler.mean().to_vec(),
        std: scaler.std().to_vec(),
    };
    let bytes = encode_artifact(ArtifactKind::Scaler, &payload)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Write a regressor artifact to disk.
///
/// # Errors
///
/// Returns an error if encoding or the file write fails.
pub fn save_regressor(path: &Path, forest: &ForestRegressor) -> Result<()> {
    let payload = RegressorPayload {
        n_features: forest.n_features(),
        trees: forest.trees().to_vec(),
    };
    let bytes = encode_artifact(ArtifactKind::Regressor, &payload)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn validate_schema(names: &[String]) -> Result<()> {
    let canonical = form::feature_names();
    if names.len() != canonical.len()
        || names.iter().zip(canonical.iter()).any(|(a, b)| a != b)
    {
        return Err(RespirarError::FormatError {
            reason: format!(
                "scaler fitted on features {names:?}, the form provides {canonical:?}"
            ),
        });
    }
    Ok(())
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ScalerPayload {
    feature_names: Vec<String>,
    mean: Vec<f32>,
    std: Vec<f32>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct RegressorPayload {
    n_features: usize,
    trees: Vec<crate::forest::TreeNode>,
}

/// Whether the scaler/model pair is ready to serve predictions.
///
/// Loading failures are captured here instead of aborting startup, so
/// the service can come up, report the problem on every surface, and
/// refuse predictions cleanly.
#[derive(Debug, Clone)]
pub enum ArtifactState {
    /// Both artifacts loaded and validated
    Loaded(Predictor),
    /// Loading failed; `reason` says which artifact and why
    Unavailable {
        /// Failure description shown to users and operators
        reason: String,
    },
}

impl ArtifactState {
    /// Load both artifacts, capturing any failure as `Unavailable`.
    #[must_use]
    pub fn from_paths(scaler_path: &Path, model_path: &Path) -> Self {
        let mut failures = Vec::new();
        let scaler = match load_scaler(scaler_path) {
            Ok(scaler) => Some(scaler),
            Err(err) => {
                failures.push(format!("scaler {}: {err}", scaler_path.display()));
                None
            }
        };
        let model = match load_regressor(model_path) {
            Ok(model) => Some(model),
            Err(err) => {
                failures.push(format!("model {}: {err}", model_path.display()));
                None
            }
        };
        match (scaler, model) {
            (Some(scaler), Some(model)) => ArtifactState::Loaded(Predictor::new(scaler, model)),
            _ => ArtifactState::Unavailable {
                reason: failures.join("; "),
            },
        }
    }

    /// Built-in demo artifacts, always loadable.
    #[must_use]
    pub fn demo() -> Self {
        ArtifactState::Loaded(Predictor::demo())
    }

    /// The predictor, if artifacts are loaded.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactsUnavailable` with the original load failure.
    pub fn predictor(&self) -> Result<&Predictor> {
        match self {
            ArtifactState::Loaded(predictor) => Ok(predictor),
            ArtifactState::Unavailable { reason } => Err(RespirarError::ArtifactsUnavailable {
                reason: reason.clone(),
            }),
        }
    }

    /// Whether predictions can be served
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, ArtifactState::Loaded(_))
    }

    /// The load failure, if any
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            ArtifactState::Loaded(_) => None,
            ArtifactState::Unavailable { reason } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = ArtifactHeader {
            version: FORMAT_VERSION,
            kind: ArtifactKind::Regressor,
            payload_len: 512,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"AQR\0");

        let mut framed = bytes.to_vec();
        framed.extend_from_slice(&[0u8; 512]);
        let parsed = ArtifactHeader::from_bytes(&framed).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(b"GGUF");
        let err = ArtifactHeader::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("bad magic"));
    }

    #[test]
    fn test_short_file_rejected() {
        let err = ArtifactHeader::from_bytes(&[0x41, 0x51]).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let header = ArtifactHeader {
            version: FORMAT_VERSION,
            kind: ArtifactKind::Scaler,
            payload_len: 0,
        };
        let mut bytes = header.to_bytes();
        bytes[8..10].copy_from_slice(&99u16.to_le_bytes());
        let err = ArtifactHeader::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("unknown artifact kind 99"));
    }

    #[test]
    fn test_future_major_version_rejected() {
        let header = ArtifactHeader {
            version: FORMAT_VERSION,
            kind: ArtifactKind::Scaler,
            payload_len: 0,
        };
        let mut bytes = header.to_bytes();
        bytes[4] = 2;
        let err = ArtifactHeader::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported format version 2.0"));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let header = ArtifactHeader {
            version: FORMAT_VERSION,
            kind: ArtifactKind::Scaler,
            payload_len: 100,
        };
        let err = ArtifactHeader::from_bytes(&header.to_bytes()).unwrap_err();
        assert!(err.to_string().contains("truncated payload"));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let payload = ScalerPayload {
            feature_names: vec!["a".to_string()],
            mean: vec![0.0],
            std: vec![1.0],
        };
        let bytes = encode_artifact(ArtifactKind::Scaler, &payload).unwrap();
        let err = decode_artifact::<ScalerPayload>(ArtifactKind::Regressor, &bytes).unwrap_err();
        assert!(err
            .to_string()
            .contains("expected a regressor artifact, found a scaler"));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let payload = ScalerPayload {
            feature_names: vec!["pm25".to_string(), "pm10".to_string()],
            mean: vec![50.0, 90.0],
            std: vec![20.0, 35.0],
        };
        let bytes = encode_artifact(ArtifactKind::Scaler, &payload).unwrap();
        let (header, decoded): (_, ScalerPayload) =
            decode_artifact(ArtifactKind::Scaler, &bytes).unwrap();
        assert_eq!(header.kind, ArtifactKind::Scaler);
        assert_eq!(decoded.mean, payload.mean);
        assert_eq!(decoded.feature_names, payload.feature_names);
    }

    #[test]
    fn test_unavailable_state_reports_reason() {
        let state = ArtifactState::Unavailable {
            reason: "scaler missing".to_string(),
        };
        assert!(!state.is_loaded());
        assert_eq!(state.failure(), Some("scaler missing"));
        let err = state.predictor().unwrap_err();
        assert!(matches!(
            err,
            RespirarError::ArtifactsUnavailable { .. }
        ));
    }

    #[test]
    fn test_demo_state_is_loaded() {
        let state = ArtifactState::demo();
        assert!(state.is_loaded());
        assert!(state.failure().is_none());
        assert!(state.predictor().is_ok());
    }
}
