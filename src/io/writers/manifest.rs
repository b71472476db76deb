use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::core::catalog::AdCategory;
use crate::core::processing::tiler::PanSummary;
use crate::error::Result;
use crate::types::OutputFormat;

/// One generated ad size.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub category: AdCategory,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub static_path: PathBuf,
    pub gif_path: Option<PathBuf>,
    pub pan: Option<PanSummary>,
}

/// JSON sidecar describing an ad set derived from one master image.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationManifest {
    pub generated_at: String,
    pub master: PathBuf,
    pub master_width: u32,
    pub master_height: u32,
    pub seed: Option<u64>,
    pub format: OutputFormat,
    pub entries: Vec<ManifestEntry>,
}

pub fn write_manifest(output: &Path, manifest: &GenerationManifest) -> Result<()> {
    let file = File::create(output)?;
    serde_json::to_writer_pretty(BufWriter::new(file), manifest)?;
    info!("Manifest written: {:?}", output);
    Ok(())
}
