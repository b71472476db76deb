//! High-level library API: derive a full ad set (static crops and looping pans) from a
//! master image, and cut sliding-window crops from a directory of images. Prefer these
//! entrypoints over the low-level processing modules when integrating adtiler.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::catalog::{AD_SIZES, AdSize, STANDARD_SIZES, find_ad_size};
use crate::core::params::{CropParams, GenerationParams};
use crate::core::processing::resize::{extract_region, resize_long_side};
use crate::core::processing::sliding::sliding_windows;
use crate::core::processing::tiler::{pan, resize_to_fit};
use crate::error::{Error, Result};
use crate::io::source::{SOURCE_EXTENSIONS, collect_images, load_source};
use crate::io::writers::gif::write_pan_gif;
use crate::io::writers::jpeg::write_rgba_jpeg;
use crate::io::writers::manifest::{GenerationManifest, ManifestEntry, write_manifest};
use crate::io::writers::write_frame;
use crate::text::{
    CandidateFontResolver, FontChoice, FontResolver, TextPainter, TextPosition, text_slug,
};
use crate::types::{Frame, OutputFormat, SourceImage};

/// Name of the JSON sidecar written next to a generated ad set.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Outcome of `generate_ad_set`
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub statics: usize,
    pub gifs: usize,
    pub entries: Vec<ManifestEntry>,
}

/// Outcome of a sliding-crop batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub crops: usize,
    /// Captioned copies of the crops
    pub variants: usize,
}

/// Files written for one source image by `crop_image_to_dir`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropCounts {
    pub crops: usize,
    pub variants: usize,
}

/// Common file-name prefix of one generation run.
pub fn output_prefix(timestamp: &str, seed: Option<u64>) -> String {
    match seed {
        Some(seed) => format!("adtiler_{timestamp}_seed{seed}"),
        None => format!("adtiler_{timestamp}"),
    }
}

/// Catalog entries named in `only`, in the order given; repeated names count once.
fn selected_sizes(only: &[String]) -> Result<Vec<&'static AdSize>> {
    if only.is_empty() {
        return Ok(AD_SIZES.iter().collect());
    }
    let mut sizes: Vec<&'static AdSize> = Vec::with_capacity(only.len());
    for name in only {
        let size = find_ad_size(name).ok_or_else(|| Error::invalid_argument("only", name))?;
        if sizes.iter().any(|s| s.name == size.name) {
            debug!("Ignoring repeated size name {}", name);
            continue;
        }
        sizes.push(size);
    }
    Ok(sizes)
}

/// Load `master` and write every catalog size under `output_dir`.
pub fn generate_ad_set(
    master: &Path,
    output_dir: &Path,
    params: &GenerationParams,
) -> Result<GenerationReport> {
    let source = load_source(master)?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let prefix = output_prefix(&timestamp, params.seed);
    generate_ad_set_from_source(&source, master, output_dir, &prefix, params)
}

/// Same as `generate_ad_set` for an already decoded master.
///
/// Layout: `<out>/<category>/<name>/<prefix>_<name>.<ext>` for the static frame and
/// `<out>/<category>/<name>/gifs/<prefix>_<name>_pan.gif` for the pan.
pub fn generate_ad_set_from_source(
    source: &SourceImage,
    master: &Path,
    output_dir: &Path,
    prefix: &str,
    params: &GenerationParams,
) -> Result<GenerationReport> {
    params.validate()?;
    let sizes = selected_sizes(&params.only)?;
    fs::create_dir_all(output_dir)?;

    info!(
        "Creating {} ad sizes from {:?} ({}x{})",
        sizes.len(),
        master,
        source.width(),
        source.height()
    );

    let mut entries = Vec::with_capacity(sizes.len());
    let mut statics = 0;
    let mut gifs = 0;

    for (i, size) in sizes.iter().enumerate() {
        let target = size.target()?;
        let size_dir = output_dir.join(size.category.dir_name()).join(size.name);
        fs::create_dir_all(&size_dir)?;

        let frame = resize_to_fit(source, target)?;
        let static_path = size_dir.join(format!(
            "{}_{}.{}",
            prefix,
            size.name,
            params.format.extension()
        ));
        write_frame(&static_path, &frame, params.format, params.jpeg_quality)?;
        statics += 1;

        let (gif_path, pan_summary) = if params.animate {
            let gif_dir = size_dir.join("gifs");
            fs::create_dir_all(&gif_dir)?;
            let sequence = pan(source, target, params.num_frames, params.frame_duration())?;
            let gif_path = gif_dir.join(format!("{}_{}_pan.gif", prefix, size.name));
            write_pan_gif(&gif_path, &sequence)?;
            gifs += 1;
            (Some(gif_path), Some(sequence.summary()))
        } else {
            (None, None)
        };

        info!(
            "[{}/{}] {} {} ({}) {}",
            i + 1,
            sizes.len(),
            size.category,
            size.name,
            target,
            if params.animate { size.pan_arrow() } else { "" }
        );

        entries.push(ManifestEntry {
            category: size.category,
            name: size.name.to_string(),
            width: size.width,
            height: size.height,
            static_path,
            gif_path,
            pan: pan_summary,
        });
    }

    let manifest_path = output_dir.join(MANIFEST_FILE);
    write_manifest(
        &manifest_path,
        &GenerationManifest {
            generated_at: chrono::Utc::now().to_rfc3339(),
            master: master.to_path_buf(),
            master_width: source.width(),
            master_height: source.height(),
            seed: params.seed,
            format: params.format,
            entries: entries.clone(),
        },
    )?;

    Ok(GenerationReport {
        output_dir: output_dir.to_path_buf(),
        manifest_path,
        statics,
        gifs,
        entries,
    })
}

/// Cut every standard size out of one image at `step_size` intervals.
///
/// The image is first scaled so its long side is `max_dimension`. Each crop lands in
/// `<out>/<w>x<h>_<i>/<w>x<h>_<i>.jpg`. With a `painter`, every caption is also written
/// at every size and position as `<out>/<w>x<h>_<i>/<size>/<slug>_<position>.jpg`.
pub fn crop_image_to_dir(
    source: &SourceImage,
    output_dir: &Path,
    params: &CropParams,
    painter: Option<&TextPainter>,
) -> Result<CropCounts> {
    params.validate()?;
    let resized = resize_long_side(source, params.max_dimension)?;
    fs::create_dir_all(output_dir)?;

    let mut counts = CropCounts::default();
    for &(ad_cols, ad_rows) in STANDARD_SIZES {
        let windows = sliding_windows(
            resized.width(),
            resized.height(),
            ad_cols,
            ad_rows,
            params.step_size,
        );
        let mut variants = 0;
        for (index, window) in windows.iter().enumerate() {
            let crop = extract_region(&resized, *window)?;
            let name = format!("{}x{}_{}", ad_cols, ad_rows, index);
            let crop_dir = output_dir.join(&name);
            fs::create_dir_all(&crop_dir)?;
            write_rgba_jpeg(
                &crop_dir.join(format!("{}.{}", name, OutputFormat::Jpeg.extension())),
                &crop,
                params.jpeg_quality,
            )?;
            if let Some(painter) = painter {
                variants += write_caption_variants(painter, &crop, &crop_dir, params)?;
            }
        }
        if !windows.is_empty() {
            debug!(
                "Generated {} crops ({} text variants) for {}x{}",
                windows.len(),
                variants,
                ad_cols,
                ad_rows
            );
        }
        counts.crops += windows.len();
        counts.variants += variants;
    }
    Ok(counts)
}

fn write_caption_variants(
    painter: &TextPainter,
    crop: &Frame,
    crop_dir: &Path,
    params: &CropParams,
) -> Result<usize> {
    let mut written = 0;
    for &size in &params.caption_sizes {
        let size_dir = crop_dir.join(size.to_string());
        fs::create_dir_all(&size_dir)?;
        for caption in &params.captions {
            let slug = text_slug(caption);
            for position in TextPosition::ALL {
                let captioned = painter.caption(crop, caption, position, size)?;
                let path = size_dir.join(format!(
                    "{}_{}.{}",
                    slug,
                    position.name(),
                    OutputFormat::Jpeg.extension()
                ));
                write_rgba_jpeg(&path, &captioned, params.jpeg_quality)?;
                written += 1;
            }
        }
    }
    Ok(written)
}

/// Loads the caption font for a crop batch.
/// A missing `font_path` is an error; with no path set and no platform font found,
/// the batch runs without text variants.
fn caption_painter(params: &CropParams) -> Result<Option<TextPainter>> {
    if !params.wants_captions() {
        return Ok(None);
    }
    let resolver = CandidateFontResolver::with_override(params.font_path.as_deref());
    let choice = resolver.resolve("caption");
    match (&choice, &params.font_path) {
        (FontChoice::Unavailable, None) => {
            warn!("No caption font found, writing crops without text variants");
            Ok(None)
        }
        _ => Ok(Some(TextPainter::from_choice(&choice, "caption")?)),
    }
}

/// Run `crop_image_to_dir` for every image directly inside `input_dir`.
/// Per-image failures are logged and counted; the batch continues.
pub fn generate_sliding_crops(
    input_dir: &Path,
    output_dir: &Path,
    params: &CropParams,
) -> Result<BatchReport> {
    params.validate()?;
    if !input_dir.is_dir() {
        return Err(Error::invalid_argument("input_dir", input_dir.display()));
    }
    let images = collect_images(input_dir, SOURCE_EXTENSIONS, false);
    let mut report = BatchReport::default();
    let painter = caption_painter(params)?;

    if images.is_empty() {
        warn!("No images found in {:?}", input_dir);
        return Ok(report);
    }
    info!("Found {} images to process", images.len());

    for path in images {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            report.skipped += 1;
            continue;
        };
        let result = load_source(&path).and_then(|source| {
            crop_image_to_dir(&source, &output_dir.join(&stem), params, painter.as_ref())
        });
        match result {
            Ok(counts) => {
                info!(
                    "{}: {} crops, {} text variants",
                    stem, counts.crops, counts.variants
                );
                report.processed += 1;
                report.crops += counts.crops;
                report.variants += counts.variants;
            }
            Err(e) => {
                warn!("Error processing {:?}: {}", path, e);
                report.errors += 1;
            }
        }
    }

    info!(
        "Batch complete: processed={} skipped={} errors={} crops={} variants={}",
        report.processed, report.skipped, report.errors, report.crops, report.variants
    );
    Ok(report)
}
