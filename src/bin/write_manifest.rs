//! Manifest utility for Glucocheck model artifacts.
//!
//! Writes `manifest.json` with the SHA-256 digest of every `*.json` model
//! artifact in a directory, so the app can verify the model at startup.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin write_manifest -- <model_dir>
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use glucocheck::adapters::model::ModelManifest;

fn usage() -> String {
    "Usage: write_manifest <model_dir>".to_string()
}

fn parse_args() -> Result<PathBuf> {
    let mut model_dir: Option<PathBuf> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => return Err(anyhow!(usage())),
            _ if model_dir.is_none() => model_dir = Some(PathBuf::from(&arg)),
            _ => return Err(anyhow!(usage())),
        }
    }

    model_dir.ok_or_else(|| anyhow!(usage()))
}

fn main() -> Result<()> {
    let model_dir = parse_args()?;

    let model_dir = if model_dir.is_file() {
        model_dir
            .parent()
            .ok_or_else(|| anyhow!("Model path has no parent directory"))?
            .to_path_buf()
    } else {
        model_dir
    };

    let manifest = ModelManifest::for_directory(&model_dir)
        .with_context(|| format!("Failed to hash model files in {model_dir:?}"))?;
    let manifest_path = manifest
        .write_to(&model_dir)
        .with_context(|| format!("Failed to write manifest into {model_dir:?}"))?;

    for (name, digest) in &manifest.files {
        println!("{digest}  {name}");
    }
    println!("Wrote manifest: {manifest_path:?}");

    Ok(())
}
