//! Respirar CLI - AQI prediction service
//!
//! # Commands
//!
//! - `serve` - Start the prediction server (web form + JSON API)
//! - `predict` - Predict once from the command line
//! - `validate` - Validate an artifact file
//! - `info` - Show version info

use clap::Parser;

use respirar::cli::{entrypoint, Cli};
use respirar::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    entrypoint(Cli::parse()).await
}
