//! CLI command implementations
//!
//! Command definitions and the logic behind them, kept out of main.rs
//! for testability.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::artifact::{
    self, ArtifactHeader, ArtifactKind, DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH,
};
use crate::error::{RespirarError, Result};
use crate::form::FormState;
use crate::pipeline::Predictor;

/// Predict the Air Quality Index from nine pollutant readings.
#[derive(Parser)]
#[command(name = "respirar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the prediction server (web form + JSON API)
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Path to the scaler artifact
        #[arg(long, default_value = DEFAULT_SCALER_PATH)]
        scaler: PathBuf,

        /// Path to the model artifact
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Use the built-in demo artifacts instead of files
        #[arg(long)]
        demo: bool,
    },
    /// Predict once from the command line
    Predict {
        /// Path to the scaler artifact
        #[arg(long, default_value = DEFAULT_SCALER_PATH)]
        scaler: PathBuf,

        /// Path to the model artifact
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Use the built-in demo artifacts instead of files
        #[arg(long)]
        demo: bool,

        /// PM2.5 concentration (µg/m³)
        #[arg(long, default_value = "60.0")]
        pm25: f32,

        /// PM10 concentration (µg/m³)
        #[arg(long, default_value = "100.0")]
        pm10: f32,

        /// NO concentration (µg/m³)
        #[arg(long, default_value = "2.5")]
        no: f32,

        /// NO2 concentration (µg/m³)
        #[arg(long, default_value = "30.0")]
        no2: f32,

        /// NOx concentration (µg/m³)
        #[arg(long, default_value = "18.0")]
        nox: f32,

        /// NH3 concentration (µg/m³)
        #[arg(long, default_value = "8.5")]
        nh3: f32,

        /// CO concentration (mg/m³)
        #[arg(long, default_value = "0.1")]
        co: f32,

        /// SO2 concentration (µg/m³)
        #[arg(long, default_value = "12.0")]
        so2: f32,

        /// O3 concentration (µg/m³)
        #[arg(long, default_value = "125.0")]
        o3: f32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Validate an artifact file and print a summary
    Validate {
        /// Artifact file to inspect
        #[arg(value_name = "ARTIFACT")]
        artifact: PathBuf,
    },
    /// Show version and feature information
    Info,
}

/// Configuration for the serve command
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Path to the scaler artifact
    pub scaler: PathBuf,
    /// Path to the model artifact
    pub model: PathBuf,
    /// Use demo artifacts instead of files
    pub demo: bool,
}

/// Main CLI entrypoint, dispatches commands to handlers
pub async fn entrypoint(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            host,
            port,
            scaler,
            model,
            demo,
        } => {
            handle_serve(ServeConfig {
                host,
                port,
                scaler,
                model,
                demo,
            })
            .await
        }
        Commands::Predict {
            scaler,
            model,
            demo,
            pm25,
            pm10,
            no,
            no2,
            nox,
            nh3,
            co,
            so2,
            o3,
            format,
        } => {
            let form = FormState {
                pm25,
                pm10,
                no,
                no2,
                nox,
                nh3,
                co,
                so2,
                o3,
            };
            handle_predict(&scaler, &model, demo, &form, &format)
        }
        Commands::Validate { artifact } => handle_validate(&artifact),
        Commands::Info => {
            print_info();
            Ok(())
        }
    }
}

/// Run one prediction and print the result.
pub fn handle_predict(
    scaler_path: &Path,
    model_path: &Path,
    demo: bool,
    form: &FormState,
    format: &str,
) -> Result<()> {
    let predictor = if demo {
        Predictor::demo()
    } else {
        let scaler = artifact::load_scaler(scaler_path)?;
        let model = artifact::load_regressor(model_path)?;
        Predictor::new(scaler, model)
    };

    let prediction = predictor.handle(form)?;

    if format == "json" {
        let payload = serde_json::json!({
            "aqi": prediction.aqi,
            "category": prediction.bucket.label(),
            "color": prediction.bucket.color(),
            "advisory": prediction.advisory(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Predicted AQI: {}", prediction.formatted_aqi());
        println!("Health Category: {}", prediction.bucket.label());
        if let Some(advisory) = prediction.advisory() {
            println!("Advisory: {advisory}");
        }
    }
    Ok(())
}

/// Inspect an artifact file and print a summary.
pub fn handle_validate(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(RespirarError::ArtifactNotFound {
            path: path.display().to_string(),
        });
    }
    let data = std::fs::read(path)?;
    let header = ArtifactHeader::from_bytes(&data)?;

    println!("Artifact: {}", path.display());
    println!("  Format: AQR v{}.{}", header.version.0, header.version.1);
    println!("  Kind: {}", header.kind.describe());
    println!("  Payload: {} bytes", header.payload_len);

    match header.kind {
        ArtifactKind::Scaler => {
            let scaler = artifact::load_scaler(path)?;
            println!("  Features: {}", scaler.n_features());
            println!("  Schema: {}", scaler.feature_names().join(", "));
        }
        ArtifactKind::Regressor => {
            let forest = artifact::load_regressor(path)?;
            println!("  Features: {}", forest.n_features());
            println!("  Trees: {}", forest.n_trees());
            println!("  Max depth: {}", forest.max_depth());
        }
    }

    println!();
    println!("Artifact OK");
    Ok(())
}

/// Print version and feature information.
pub fn print_info() {
    println!("Respirar v{}", crate::VERSION);
    println!("AQI prediction service");
    println!();
    println!("Features:");
    println!("  - Nine-pollutant feature vector (PM2.5 through O3)");
    println!("  - Standard-score scaling with offline-fitted parameters");
    println!("  - Random-forest regression over AQR artifacts");
    println!("  - Six-tier health categories with advisories");
    println!("  - Web form and JSON API for predictions");
}

// ============================================================================
// Server command, gated behind the "server" feature
// ============================================================================
#[cfg(feature = "server")]
mod server_commands {
    use super::ServeConfig;
    use crate::artifact::ArtifactState;
    use crate::error::{RespirarError, Result};

    /// Serve the prediction form and API over HTTP.
    pub async fn handle_serve(config: ServeConfig) -> Result<()> {
        use std::net::SocketAddr;

        println!("Starting respirar prediction server...");

        let artifacts = if config.demo {
            println!("Artifacts: built-in demo pair");
            ArtifactState::demo()
        } else {
            println!("Scaler: {}", config.scaler.display());
            println!("Model:  {}", config.model.display());
            ArtifactState::from_paths(&config.scaler, &config.model)
        };

        if let Some(reason) = artifacts.failure() {
            eprintln!("Warning: artifacts unavailable: {reason}");
            eprintln!("The form will load, but predictions stay disabled until valid artifacts are provided.");
        }

        let state = crate::api::AppState::new(artifacts);
        let app = crate::api::create_router(state);

        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| RespirarError::InvalidConfiguration {
                reason: format!("Invalid address: {e}"),
            })?;

        println!("Server listening on http://{addr}");
        println!();
        println!("Endpoints:");
        println!("  GET  /           - AQI input form");
        println!("  POST /v1/predict - JSON prediction API");
        println!("  GET  /health     - Health check");
        println!("  GET  /ready      - Artifact readiness");
        println!("  GET  /metrics    - Prometheus metrics");
        println!();
        println!("Example:");
        println!("  curl http://{addr}/health");
        println!();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RespirarError::IoError {
                message: format!("Failed to bind {addr}: {e}"),
            })?;

        axum::serve(listener, app)
            .await
            .map_err(|e| RespirarError::IoError {
                message: format!("Server error: {e}"),
            })?;

        Ok(())
    }
}

#[cfg(feature = "server")]
pub use server_commands::handle_serve;

/// Fallback when the server feature is disabled
#[cfg(not(feature = "server"))]
#[allow(clippy::unused_async)]
pub async fn handle_serve(config: ServeConfig) -> Result<()> {
    let _ = config;
    Err(RespirarError::InvalidConfiguration {
        reason: "this build does not include the server feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{ForestRegressor, TreeNode};
    use crate::scaler::StandardScaler;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn test_serve_defaults() {
        let cli = parse(&["respirar", "serve"]);
        match cli.command {
            Commands::Serve {
                host,
                port,
                scaler,
                model,
                demo,
            } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8080);
                assert_eq!(scaler, PathBuf::from(DEFAULT_SCALER_PATH));
                assert_eq!(model, PathBuf::from(DEFAULT_MODEL_PATH));
                assert!(!demo);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = parse(&[
            "respirar", "serve", "-H", "0.0.0.0", "-p", "9000", "--demo",
        ]);
        match cli.command {
            Commands::Serve {
                host, port, demo, ..
            } => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 9000);
                assert!(demo);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_predict_defaults_match_form_defaults() {
        let cli = parse(&["respirar", "predict"]);
        match cli.command {
            Commands::Predict {
                pm25,
                pm10,
                no,
                no2,
                nox,
                nh3,
                co,
                so2,
                o3,
                format,
                ..
            } => {
                let form = FormState {
                    pm25,
                    pm10,
                    no,
                    no2,
                    nox,
                    nh3,
                    co,
                    so2,
                    o3,
                };
                assert_eq!(form, FormState::default());
                assert_eq!(format, "text");
            }
            _ => panic!("expected predict command"),
        }
    }

    #[test]
    fn test_predict_flag_overrides() {
        let cli = parse(&[
            "respirar", "predict", "--pm25", "180.5", "--co", "1.2", "--format", "json",
        ]);
        match cli.command {
            Commands::Predict {
                pm25, co, format, ..
            } => {
                assert_eq!(pm25, 180.5);
                assert_eq!(co, 1.2);
                assert_eq!(format, "json");
            }
            _ => panic!("expected predict command"),
        }
    }

    #[test]
    fn test_handle_predict_demo_text() {
        let result = handle_predict(
            Path::new("missing.aqr"),
            Path::new("missing.aqr"),
            true,
            &FormState::default(),
            "text",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_handle_predict_demo_json() {
        let result = handle_predict(
            Path::new("missing.aqr"),
            Path::new("missing.aqr"),
            true,
            &FormState::default(),
            "json",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_handle_predict_missing_artifacts() {
        let result = handle_predict(
            Path::new("definitely-missing.aqr"),
            Path::new("also-missing.aqr"),
            false,
            &FormState::default(),
            "text",
        );
        assert!(matches!(
            result,
            Err(RespirarError::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn test_handle_validate_missing_file() {
        let result = handle_validate(Path::new("nope.aqr"));
        assert!(matches!(
            result,
            Err(RespirarError::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn test_handle_validate_scaler_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scaler.aqr");
        let names: Vec<String> = crate::form::feature_names()
            .iter()
            .map(ToString::to_string)
            .collect();
        let scaler =
            StandardScaler::new(names, vec![50.0; 9], vec![10.0; 9]).expect("valid scaler");
        artifact::save_scaler(&path, &scaler).expect("save scaler");
        assert!(handle_validate(&path).is_ok());
    }

    #[test]
    fn test_handle_validate_regressor_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.aqr");
        let forest = ForestRegressor::new(9, vec![TreeNode::Leaf { value: 120.0 }])
            .expect("valid forest");
        artifact::save_regressor(&path, &forest).expect("save forest");
        assert!(handle_validate(&path).is_ok());
    }
}
