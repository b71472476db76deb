use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use adtiler::OutputFormat;

#[derive(Parser)]
#[command(name = "adtiler", version, about = "Ad-size variants and pan animations from one master image")]
pub struct CliArgs {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write every catalog size (static image and looping pan GIF) from one master image
    Generate(GenerateArgs),
    /// Cut sliding-window crops of the standard sizes from every image in a directory
    Crops(CropsArgs),
    /// One-sided binomial test of whether a CTR is below a target
    Ctr(CtrArgs),
    /// Burn a saved text overlay into its image (every frame for GIFs)
    Overlay(OverlayArgs),
    /// List the ad-size catalog
    Sizes,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Master image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for the ad set
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// JSON file with generation parameters; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed the master image was generated with, recorded in file names
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frames per pan animation
    #[arg(long)]
    pub frames: Option<usize>,

    /// Milliseconds per pan frame
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// Static image format (png or jpeg)
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Skip the pan GIFs
    #[arg(long, default_value_t = false)]
    pub no_gif: bool,

    /// Only these catalog names (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,
}

#[derive(Args)]
pub struct CropsArgs {
    /// Directory containing source images
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Output directory; one subdirectory per image
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Long side after the initial resize
    #[arg(long, default_value_t = 970)]
    pub max_dimension: u32,

    /// Pixels the crop window moves per step
    #[arg(long, default_value_t = 50)]
    pub step: u32,

    /// Skip the captioned variants of each crop
    #[arg(long, default_value_t = false)]
    pub no_text: bool,

    /// Caption font file (default: search common system fonts)
    #[arg(long)]
    pub font: Option<PathBuf>,
}

#[derive(Args)]
pub struct OverlayArgs {
    /// Saved overlay record (JSON)
    #[arg(long, conflicts_with = "image")]
    pub json: Option<PathBuf>,

    /// Image whose most recent saved overlay should be burned
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Directory holding saved overlay records
    #[arg(long, default_value = "jsons")]
    pub json_dir: PathBuf,

    /// Output directory for the burned image
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Font file used for every text item
    #[arg(long)]
    pub font: Option<PathBuf>,
}

#[derive(Args)]
pub struct CtrArgs {
    #[arg(long)]
    pub clicks: u64,

    #[arg(long)]
    pub impressions: u64,

    /// CTR under the null hypothesis
    #[arg(long, default_value_t = adtiler::stats::DEFAULT_TARGET_CTR)]
    pub target_ctr: f64,

    /// Significance level
    #[arg(long, default_value_t = adtiler::stats::DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Print the full result as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
