//! Editable text-overlay records and their rendering.
//!
//! `OverlayDocument` is the saved form of a text-overlay edit: a versioned JSON record
//! that keeps fields it does not understand, so newer editors can round-trip through
//! older ones. `OverlayRenderer` burns the items into a still image or into every frame
//! of an animated GIF; fonts come from a `FontResolver`.
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Frame as GifFrame, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::io::source::has_extension;
use crate::io::writers::gif::write_gif_frames;
use crate::io::writers::write_frame;
use crate::text::{FontChoice, FontResolver, TextPainter, clamp_i32, load_font, parse_color};
use crate::types::{Frame, OutputFormat};

/// JPEG quality for burned-in still images.
const OVERLAY_JPEG_QUALITY: u8 = 95;

pub const OVERLAY_VERSION: u32 = 1;

fn overlay_version() -> u32 {
    OVERLAY_VERSION
}

fn default_color() -> String {
    "white".to_string()
}

fn default_outline_color() -> String {
    "black".to_string()
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_scale() -> f64 {
    1.0
}

/// One text item, positioned in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    pub canvas_x: f64,
    pub canvas_y: f64,
    /// Canvas position of the image's top-left corner when the item was placed.
    #[serde(default)]
    pub img_offset_x: f64,
    #[serde(default)]
    pub img_offset_y: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    pub font_size: u32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub outline_width: u32,
    #[serde(default = "default_outline_color")]
    pub outline_color: String,
}

/// Text placement resolved to image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlacement {
    pub x: i64,
    pub y: i64,
    pub font_size: u32,
    /// Zero means no outline.
    pub outline_width: u32,
}

impl TextOverlay {
    /// Maps canvas coordinates to image pixels for an image shown at `image_scale`
    /// with its top-left corner at `image_origin` on the canvas.
    pub fn to_image_space(&self, image_scale: f64, image_origin: (f64, f64)) -> ImagePlacement {
        let scale = if image_scale > 0.0 { image_scale } else { 1.0 };
        let outline_width = if self.outline_width > 0 {
            ((self.outline_width as f64 / scale) as u32).max(1)
        } else {
            0
        };
        ImagePlacement {
            x: ((self.canvas_x - image_origin.0) / scale) as i64,
            y: ((self.canvas_y - image_origin.1) / scale) as i64,
            font_size: ((self.font_size as f64 / scale) as u32).max(1),
            outline_width,
        }
    }

    /// Moves the item by however much the image moved on the canvas since it was saved.
    pub fn reanchor(&mut self, image_origin: (f64, f64)) {
        self.canvas_x += image_origin.0 - self.img_offset_x;
        self.canvas_y += image_origin.1 - self.img_offset_y;
        self.img_offset_x = image_origin.0;
        self.img_offset_y = image_origin.1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDocument {
    #[serde(default = "overlay_version")]
    pub version: u32,
    pub original_image_path: PathBuf,
    #[serde(default, alias = "is_animated_gif")]
    pub is_animated: bool,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_height: u32,
    #[serde(default)]
    pub canvas_width: u32,
    #[serde(default)]
    pub canvas_height: u32,
    #[serde(default = "default_scale")]
    pub image_scale: f64,
    #[serde(default)]
    pub text_items: Vec<TextOverlay>,
    /// Fields written by newer versions, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl OverlayDocument {
    pub fn new(original_image_path: PathBuf, image_width: u32, image_height: u32) -> Self {
        Self {
            version: OVERLAY_VERSION,
            original_image_path,
            is_animated: false,
            image_width,
            image_height,
            canvas_width: 0,
            canvas_height: 0,
            image_scale: 1.0,
            text_items: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let doc: Self = serde_json::from_str(text)?;
        if doc.version > OVERLAY_VERSION {
            warn!(
                "Overlay version {} is newer than {}, unknown fields kept as-is",
                doc.version, OVERLAY_VERSION
            );
        }
        Ok(doc)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Image name without a trailing `_text` or `_text_<n>` from earlier saves.
pub fn overlay_base_name(stem: &str) -> &str {
    if let Some(idx) = stem.rfind("_text") {
        let tail = &stem[idx + "_text".len()..];
        let numbered = tail
            .strip_prefix('_')
            .map(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(false);
        if tail.is_empty() || numbered {
            return &stem[..idx];
        }
    }
    stem
}

/// First free `(image, json)` output pair for `image_name`:
/// `<base>_text.<ext>`, then `<base>_text_1.<ext>`, `<base>_text_2.<ext>`, ...
pub fn overlay_output_paths(
    output_dir: &Path,
    json_dir: &Path,
    image_name: &str,
    exists: impl Fn(&Path) -> bool,
) -> (PathBuf, PathBuf) {
    let path = Path::new(image_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let base = overlay_base_name(&stem);

    let mut image_path = output_dir.join(format!("{base}_text{ext}"));
    let mut json_path = json_dir.join(format!("{base}_text.json"));
    let mut counter = 1;
    while exists(&image_path) {
        image_path = output_dir.join(format!("{base}_text_{counter}{ext}"));
        json_path = json_dir.join(format!("{base}_text_{counter}.json"));
        counter += 1;
    }
    (image_path, json_path)
}

/// Saved overlay JSON for `image_name` that was modified last.
///
/// Looks at `<stem>_text.json` and the consecutive `<stem>_text_<n>.json` files in
/// `json_dir`, stopping at the first missing number.
pub fn latest_overlay_json(json_dir: &Path, image_name: &str) -> Option<PathBuf> {
    let stem = Path::new(image_name).file_stem()?.to_string_lossy().into_owned();
    let mut candidates = vec![json_dir.join(format!("{stem}_text.json"))];
    for counter in 1.. {
        let path = json_dir.join(format!("{stem}_text_{counter}.json"));
        if !path.is_file() {
            break;
        }
        candidates.push(path);
    }

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in candidates {
        let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) else {
            continue;
        };
        if latest.as_ref().is_none_or(|(newest, _)| modified > *newest) {
            latest = Some((modified, path));
        }
    }
    if let Some((_, path)) = &latest {
        debug!("Found saved overlay {:?} for {}", path, image_name);
    }
    latest.map(|(_, path)| path)
}

struct PreparedItem {
    text: String,
    placement: ImagePlacement,
    painter: usize,
    fill: Rgba<u8>,
    outline: Rgba<u8>,
}

/// Text items resolved to image pixels, colors and loaded fonts, ready to draw on
/// any number of frames.
pub struct OverlayRenderer {
    painters: Vec<(PathBuf, TextPainter)>,
    items: Vec<PreparedItem>,
}

impl OverlayRenderer {
    /// Fails if an item's font cannot be found or loaded, or a color is unknown.
    pub fn new(doc: &OverlayDocument, resolver: &dyn FontResolver) -> Result<Self> {
        let mut painters: Vec<(PathBuf, TextPainter)> = Vec::new();
        let mut items = Vec::with_capacity(doc.text_items.len());

        for item in &doc.text_items {
            let path = match resolver.resolve(&item.font_family) {
                FontChoice::File(path) => path,
                FontChoice::Unavailable => {
                    return Err(Error::MissingFont {
                        family: item.font_family.clone(),
                    });
                }
            };
            let painter = match painters.iter().position(|(p, _)| *p == path) {
                Some(index) => index,
                None => {
                    let painter = TextPainter::new(load_font(&path)?);
                    painters.push((path, painter));
                    painters.len() - 1
                }
            };
            items.push(PreparedItem {
                text: item.text.clone(),
                placement: item
                    .to_image_space(doc.image_scale, (item.img_offset_x, item.img_offset_y)),
                painter,
                fill: parse_color(&item.color)?,
                outline: parse_color(&item.outline_color)?,
            });
        }
        Ok(Self { painters, items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Draws every item centered on its placement.
    pub fn draw(&self, image: &mut RgbaImage) {
        for item in &self.items {
            let painter = &self.painters[item.painter].1;
            let outline = (item.placement.outline_width > 0)
                .then_some((item.outline, item.placement.outline_width));
            painter.draw_centered(
                image,
                &item.text,
                (clamp_i32(item.placement.x), clamp_i32(item.placement.y)),
                item.placement.font_size as f32,
                item.fill,
                outline,
            );
        }
    }
}

/// Draws the items of `doc` onto `image` in place.
pub fn render_overlay(
    doc: &OverlayDocument,
    image: &mut RgbaImage,
    resolver: &dyn FontResolver,
) -> Result<()> {
    OverlayRenderer::new(doc, resolver)?.draw(image);
    Ok(())
}

/// Renders `doc` onto its original image and writes the result to `output`.
///
/// GIF originals keep every frame and its delay; other images are written as PNG or
/// JPEG according to the extension of `output`. Returns the number of frames written.
pub fn burn_overlay(
    doc: &OverlayDocument,
    output: &Path,
    resolver: &dyn FontResolver,
) -> Result<usize> {
    let renderer = OverlayRenderer::new(doc, resolver)?;

    if has_extension(&doc.original_image_path, &["gif"]) {
        let file = File::open(&doc.original_image_path)?;
        let frames = GifDecoder::new(BufReader::new(file))?
            .into_frames()
            .collect_frames()?;
        let burned = frames.into_iter().map(|frame| {
            let delay = frame.delay();
            let mut buffer = frame.into_buffer();
            renderer.draw(&mut buffer);
            GifFrame::from_parts(buffer, 0, 0, delay)
        });
        let count = write_gif_frames(output, burned, true)?;
        info!("Burned {} overlays into {} GIF frames: {:?}", renderer.len(), count, output);
        return Ok(count);
    }

    let format = OutputFormat::from_path(output)?;
    let mut image = image::open(&doc.original_image_path)?.to_rgba8();
    renderer.draw(&mut image);
    write_frame(output, &Frame::from_rgba_image(image)?, format, OVERLAY_JPEG_QUALITY)?;
    info!("Burned {} overlays into {:?}", renderer.len(), output);
    Ok(1)
}

/// Burns `doc` into the first free `<base>_text[_n]` file of `output_dir` and saves the
/// record next to it in `json_dir`. Returns `(image, json)` paths.
pub fn save_overlay(
    doc: &OverlayDocument,
    output_dir: &Path,
    json_dir: &Path,
    resolver: &dyn FontResolver,
) -> Result<(PathBuf, PathBuf)> {
    let image_name = doc
        .original_image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::invalid_argument("original_image_path", doc.original_image_path.display())
        })?;
    fs::create_dir_all(output_dir)?;
    fs::create_dir_all(json_dir)?;

    let (image_path, json_path) =
        overlay_output_paths(output_dir, json_dir, &image_name, |p| p.exists());
    burn_overlay(doc, &image_path, resolver)?;
    doc.save(&json_path)?;
    Ok((image_path, json_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::CandidateFontResolver;

    fn item() -> TextOverlay {
        TextOverlay {
            text: "Buy Now!".to_string(),
            canvas_x: 300.0,
            canvas_y: 150.0,
            img_offset_x: 100.0,
            img_offset_y: 50.0,
            font_family: "Arial".to_string(),
            font_size: 36,
            color: "white".to_string(),
            outline_width: 3,
            outline_color: "black".to_string(),
        }
    }

    #[test]
    fn canvas_to_image_space() {
        let placed = item().to_image_space(0.5, (100.0, 50.0));
        assert_eq!(
            placed,
            ImagePlacement {
                x: 400,
                y: 200,
                font_size: 72,
                outline_width: 6
            }
        );

        let mut thin = item();
        thin.outline_width = 1;
        assert_eq!(thin.to_image_space(4.0, (0.0, 0.0)).outline_width, 1);
        thin.outline_width = 0;
        assert_eq!(thin.to_image_space(4.0, (0.0, 0.0)).outline_width, 0);
    }

    #[test]
    fn reanchor_follows_image_origin() {
        let mut t = item();
        t.reanchor((120.0, 40.0));
        assert_eq!((t.canvas_x, t.canvas_y), (320.0, 140.0));
        assert_eq!((t.img_offset_x, t.img_offset_y), (120.0, 40.0));
    }

    #[test]
    fn document_accepts_unversioned_records_and_keeps_unknown_fields() {
        let json = r#"{
            "original_image_path": "/imgs/a.png",
            "is_animated_gif": true,
            "image_width": 1024,
            "image_height": 1024,
            "image_scale": 0.68,
            "text_items": [
                { "text": "Hi", "canvas_x": 10, "canvas_y": 20, "font_size": 24 }
            ],
            "layer_blend": "multiply"
        }"#;
        let doc = OverlayDocument::from_json(json).unwrap();
        assert_eq!(doc.version, OVERLAY_VERSION);
        assert!(doc.is_animated);
        assert_eq!(doc.text_items[0].color, "white");
        assert_eq!(doc.text_items[0].outline_color, "black");
        assert_eq!(doc.extra["layer_blend"], "multiply");

        let written: Value = serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(written["layer_blend"], "multiply");
        assert_eq!(written["version"], 1);
    }

    #[test]
    fn document_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a_text.json");
        let mut doc = OverlayDocument::new(PathBuf::from("/imgs/a.png"), 300, 250);
        doc.text_items.push(item());
        doc.save(&path).unwrap();
        assert_eq!(OverlayDocument::load(&path).unwrap(), doc);
    }

    #[test]
    fn base_name_strips_previous_suffix() {
        assert_eq!(overlay_base_name("promo_text"), "promo");
        assert_eq!(overlay_base_name("promo_text_12"), "promo");
        assert_eq!(overlay_base_name("promo_texture"), "promo_texture");
        assert_eq!(overlay_base_name("promo_text_"), "promo_text_");
        assert_eq!(overlay_base_name("promo"), "promo");
    }

    #[test]
    fn output_paths_pick_first_free_slot() {
        let out = Path::new("/out");
        let json = Path::new("/out/jsons");
        let taken = [PathBuf::from("/out/promo_text.png"), PathBuf::from("/out/promo_text_1.png")];
        let (image, data) =
            overlay_output_paths(out, json, "promo_text_1.png", |p| taken.iter().any(|t| t == p));
        assert_eq!(image, PathBuf::from("/out/promo_text_2.png"));
        assert_eq!(data, PathBuf::from("/out/jsons/promo_text_2.json"));

        let (image, data) = overlay_output_paths(out, json, "fresh.jpg", |_| false);
        assert_eq!(image, PathBuf::from("/out/fresh_text.jpg"));
        assert_eq!(data, PathBuf::from("/out/jsons/fresh_text.json"));
    }

    #[test]
    fn latest_json_prefers_newest_consecutive_save() {
        let dir = tempfile::tempdir().unwrap();
        let base = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let touch = |name: &str, secs: u64| {
            let path = dir.path().join(name);
            fs::write(&path, "{}").unwrap();
            File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(base + std::time::Duration::from_secs(secs))
                .unwrap();
            path
        };

        assert_eq!(latest_overlay_json(dir.path(), "promo.png"), None);

        touch("promo_text.json", 10);
        let newest = touch("promo_text_1.json", 30);
        touch("promo_text_2.json", 20);
        // not reachable: _text_3 is missing
        touch("promo_text_4.json", 99);
        touch("other_text.json", 500);

        assert_eq!(latest_overlay_json(dir.path(), "promo.png"), Some(newest));
        assert_eq!(
            latest_overlay_json(dir.path(), "other.gif"),
            Some(dir.path().join("other_text.json"))
        );
    }

    fn system_resolver() -> Option<CandidateFontResolver> {
        let resolver = CandidateFontResolver::system_default();
        match resolver.resolve("test") {
            FontChoice::File(_) => Some(resolver),
            FontChoice::Unavailable => None,
        }
    }

    fn centered_item(text: &str, x: f64, y: f64, font_size: u32) -> TextOverlay {
        TextOverlay {
            text: text.to_string(),
            canvas_x: x,
            canvas_y: y,
            img_offset_x: 0.0,
            img_offset_y: 0.0,
            font_family: "Arial".to_string(),
            font_size,
            color: "white".to_string(),
            outline_width: 1,
            outline_color: "black".to_string(),
        }
    }

    fn has_bright_pixel(image: &RgbaImage) -> bool {
        image.pixels().any(|p| p[0] > 200 && p[1] > 200 && p[2] > 200)
    }

    #[test]
    fn renderer_requires_a_font_and_known_colors() {
        let dir = tempfile::tempdir().unwrap();
        let none = CandidateFontResolver::new(vec![dir.path().join("none.ttf")]);
        let mut doc = OverlayDocument::new(PathBuf::from("a.png"), 10, 10);
        assert!(OverlayRenderer::new(&doc, &none).unwrap().is_empty());

        doc.text_items.push(item());
        assert!(matches!(
            OverlayRenderer::new(&doc, &none),
            Err(Error::MissingFont { .. })
        ));

        let Some(resolver) = system_resolver() else {
            eprintln!("no system font installed, skipping");
            return;
        };
        doc.text_items[0].color = "ultraviolet".to_string();
        assert!(matches!(
            OverlayRenderer::new(&doc, &resolver),
            Err(Error::InvalidColor(_))
        ));
    }

    #[test]
    fn render_overlay_draws_at_scaled_position() {
        let Some(resolver) = system_resolver() else {
            eprintln!("no system font installed, skipping");
            return;
        };
        // canvas shows the image at half size: (50, 25) on canvas is (100, 50) in pixels
        let mut doc = OverlayDocument::new(PathBuf::from("a.png"), 200, 100);
        doc.image_scale = 0.5;
        doc.text_items.push(centered_item("HI", 50.0, 25.0, 12));

        let mut image = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        render_overlay(&doc, &mut image, &resolver).unwrap();

        let lit: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] > 200)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| (60..140).contains(&x) && (20..80).contains(&y)));
    }

    #[test]
    fn saving_burns_every_gif_frame_and_keeps_delays() {
        let Some(resolver) = system_resolver() else {
            eprintln!("no system font installed, skipping");
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("promo.gif");
        let frames = [120u64, 80].map(|ms| {
            GifFrame::from_parts(
                RgbaImage::from_pixel(120, 60, Rgba([0, 0, 0, 255])),
                0,
                0,
                image::Delay::from_saturating_duration(std::time::Duration::from_millis(ms)),
            )
        });
        write_gif_frames(&original, frames, true).unwrap();

        let mut doc = OverlayDocument::new(original, 120, 60);
        doc.is_animated = true;
        doc.text_items.push(centered_item("SALE", 60.0, 30.0, 24));

        let out = dir.path().join("out");
        let jsons = out.join("jsons");
        let (image_path, json_path) = save_overlay(&doc, &out, &jsons, &resolver).unwrap();
        assert_eq!(image_path, out.join("promo_text.gif"));
        assert_eq!(json_path, jsons.join("promo_text.json"));
        assert_eq!(OverlayDocument::load(&json_path).unwrap(), doc);

        let decoded = GifDecoder::new(BufReader::new(File::open(&image_path).unwrap()))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(decoded.len(), 2);
        let delays: Vec<f64> = decoded
            .iter()
            .map(|f| {
                let (n, d) = f.delay().numer_denom_ms();
                n as f64 / d as f64
            })
            .collect();
        assert_eq!(delays, vec![120.0, 80.0]);
        assert!(decoded.iter().all(|f| has_bright_pixel(f.buffer())));

        let (second, _) = save_overlay(&doc, &out, &jsons, &resolver).unwrap();
        assert_eq!(second, out.join("promo_text_1.gif"));
        assert!(latest_overlay_json(&jsons, "promo.gif").is_some());
    }

    #[test]
    fn saving_still_image_uses_output_extension() {
        let Some(resolver) = system_resolver() else {
            eprintln!("no system font installed, skipping");
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("banner.jpg");
        image::RgbImage::from_pixel(160, 80, image::Rgb([40, 40, 40]))
            .save(&original)
            .unwrap();

        let mut doc = OverlayDocument::new(original, 160, 80);
        doc.text_items.push(centered_item("Buy Now!", 80.0, 40.0, 20));
        let (image_path, _) =
            save_overlay(&doc, &dir.path().join("out"), &dir.path().join("jsons"), &resolver)
                .unwrap();
        assert_eq!(image_path.extension().unwrap(), "jpg");

        let burned = image::open(&image_path).unwrap().to_rgba8();
        assert_eq!(burned.dimensions(), (160, 80));
        assert!(has_bright_pixel(&burned));
    }
}
