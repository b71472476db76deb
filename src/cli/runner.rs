use tracing::info;
use tracing_subscriber::EnvFilter;

use adtiler::api::{generate_ad_set, generate_sliding_crops};
use adtiler::core::catalog::AD_SIZES;
use adtiler::overlay::{OverlayDocument, latest_overlay_json, save_overlay};
use adtiler::stats::site_ctr_test;
use adtiler::text::CandidateFontResolver;
use adtiler::{CropParams, GenerationParams};

use super::args::{CliArgs, Command, CropsArgs, CtrArgs, GenerateArgs, OverlayArgs};
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Config file values first, then any flags given on the command line.
fn generation_params(args: &GenerateArgs) -> Result<GenerationParams, AppError> {
    let mut params = match &args.config {
        Some(path) => GenerationParams::from_json_file(path)?,
        None => GenerationParams::default(),
    };
    if let Some(frames) = args.frames {
        params.num_frames = frames;
    }
    if let Some(ms) = args.duration_ms {
        params.frame_duration_ms = ms;
    }
    if let Some(format) = args.format {
        params.format = format;
    }
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    if args.no_gif {
        params.animate = false;
    }
    if !args.only.is_empty() {
        params.only = args.only.clone();
    }
    params.validate()?;
    Ok(params)
}

fn run_generate(args: GenerateArgs) -> Result<(), AppError> {
    if !args.input.is_file() {
        return Err(AppError::MissingInput { path: args.input });
    }
    let params = generation_params(&args)?;
    let report = generate_ad_set(&args.input, &args.output_dir, &params)?;

    info!(
        "Created {} static images and {} pan GIFs in {:?}",
        report.statics, report.gifs, report.output_dir
    );
    info!("Manifest: {:?}", report.manifest_path);
    Ok(())
}

fn crop_params(args: &CropsArgs) -> CropParams {
    let mut params = CropParams {
        max_dimension: args.max_dimension,
        step_size: args.step,
        font_path: args.font.clone(),
        ..CropParams::default()
    };
    if args.no_text {
        params.captions.clear();
    }
    params
}

fn run_crops(args: CropsArgs) -> Result<(), AppError> {
    if !args.input_dir.is_dir() {
        return Err(AppError::MissingInput {
            path: args.input_dir,
        });
    }
    let params = crop_params(&args);
    let report = generate_sliding_crops(&args.input_dir, &args.output_dir, &params)?;
    println!(
        "processed={} skipped={} errors={} crops={} variants={}",
        report.processed, report.skipped, report.errors, report.crops, report.variants
    );
    if report.errors > 0 {
        return Err(AppError::BatchFailures {
            errors: report.errors,
        });
    }
    Ok(())
}

fn run_ctr(args: CtrArgs) -> Result<(), Box<dyn std::error::Error>> {
    let result = site_ctr_test(args.clicks, args.impressions, args.target_ctr, args.alpha)
        .map_err(AppError::from)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "observed_ctr={:.6} p_value={:.6} ({:?}) significant={}",
            result.observed_ctr, result.p_value, result.method, result.significant
        );
        println!("{}", result.interpretation);
    }
    Ok(())
}

fn run_overlay(args: OverlayArgs) -> Result<(), AppError> {
    let json_path = match (&args.json, &args.image) {
        (Some(json), _) => json.clone(),
        (None, Some(image)) => {
            let name = image
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            latest_overlay_json(&args.json_dir, &name).ok_or_else(|| AppError::NoSavedOverlay {
                image: image.clone(),
                json_dir: args.json_dir.clone(),
            })?
        }
        (None, None) => return Err(AppError::OverlaySourceMissing),
    };
    if !json_path.is_file() {
        return Err(AppError::MissingInput { path: json_path });
    }

    let doc = OverlayDocument::load(&json_path)?;
    let resolver = CandidateFontResolver::with_override(args.font.as_deref());
    let (image_path, record_path) = save_overlay(&doc, &args.output_dir, &args.json_dir, &resolver)?;
    info!("Overlay from {:?} burned into {:?}", json_path, image_path);
    info!("Editable record: {:?}", record_path);
    Ok(())
}

fn print_sizes() {
    for size in AD_SIZES {
        println!(
            "{:<8} {:<24} {:>4}x{:<4} {}",
            size.category.dir_name(),
            size.name,
            size.width,
            size.height,
            size.pan_arrow()
        );
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.verbose);

    match args.command {
        Command::Generate(generate) => run_generate(generate)?,
        Command::Crops(crops) => run_crops(crops)?,
        Command::Ctr(ctr) => run_ctr(ctr)?,
        Command::Overlay(overlay) => run_overlay(overlay)?,
        Command::Sizes => print_sizes(),
    }
    Ok(())
}
