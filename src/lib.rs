#![doc = r#"
ADTILER — derive every ad-size variant from one master image.

Given a single master creative, this crate produces a static image for each
size in the ad catalog (center crop to the target aspect, then Lanczos3 resize)
and a looping pan animation that slides a target-aspect window across the
master. It also cuts sliding-window crops of the standard IAB sizes from whole
directories (optionally with captioned variants), runs a one-sided binomial CTR
test, burns saved text overlays into images and GIFs, and carries the state model
behind the interactive review tool.

Stability
---------
The public library API is experimental in initial releases and may evolve.
Breaking changes can occur.

Add dependency
--------------
```toml
[dependencies]
adtiler = "0.1"
```

Quick start: one static frame and one pan
-----------------------------------------
```rust,no_run
use std::path::Path;
use std::time::Duration;
use adtiler::{pan, resize_to_fit, TargetRect};
use adtiler::io::load_source;

fn main() -> adtiler::Result<()> {
    let master = load_source(Path::new("/data/master.png"))?;
    let billboard = TargetRect::new(968, 248)?;

    let frame = resize_to_fit(&master, billboard)?;
    assert_eq!(frame.dimensions(), (968, 248));

    let sequence = pan(&master, billboard, 40, Duration::from_millis(300))?;
    println!("{} frames along the {} axis", sequence.len(), sequence.axis);
    Ok(())
}
```

Generate a complete ad set
--------------------------
```rust,no_run
use std::path::Path;
use adtiler::{generate_ad_set, GenerationParams};

fn main() -> adtiler::Result<()> {
    let params = GenerationParams {
        seed: Some(42),
        ..GenerationParams::default()
    };
    let report = generate_ad_set(
        Path::new("/data/master.png"),
        Path::new("/out/ads"),
        &params,
    )?;
    println!("statics={} gifs={}", report.statics, report.gifs);
    Ok(())
}
```

CTR check
---------
```rust
use adtiler::site_ctr_test;

let result = site_ctr_test(0, 5000, 0.001, 0.01).unwrap();
assert!(result.significant);
```

Error handling
--------------
All public functions return `adtiler::Result<T>`; match on `adtiler::Error` to handle
specific cases.

```rust,no_run
use std::time::Duration;
use adtiler::{pan, Error, SourceImage, TargetRect};

fn main() {
    let source = SourceImage::from_rgba(4, 4, vec![0; 64]).unwrap();
    let target = TargetRect::new(2, 2).unwrap();
    match pan(&source, target, 0, Duration::from_millis(100)) {
        Ok(seq) => println!("{} frames", seq.len()),
        Err(Error::InvalidFrameCount { frames }) => eprintln!("bad frame count {frames}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level entry points for ad sets and sliding crops.
- [`core`] — catalog, geometry, parameters and raster processing.
- [`io`] — image loading and PNG/JPEG/GIF/manifest writers.
- [`stats`] — CTR significance test.
- [`review`] — review queue, checked ledger and animation clock.
- [`overlay`] — text overlay documents, burning them into images and GIFs.
- [`text`] — font resolution, captions and outlined text drawing.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod overlay;
pub mod review;
pub mod stats;
pub mod text;
pub mod types;

// Curated public API surface
// Types
pub use core::catalog::{AD_SIZES, AdCategory, AdSize, STANDARD_SIZES, find_ad_size};
pub use core::geometry::{CropBox, PanPlan, center_crop_box, plan_pan};
pub use core::params::{CropParams, GenerationParams};
pub use error::{Error, Result};
pub use types::{Frame, OutputFormat, PanAxis, SourceImage, TargetRect};

// Processing
pub use core::processing::tiler::{PanFrame, PanSequence, pan, resize_to_fit};

// High-level API re-exports
pub use api::{
    BatchReport, CropCounts, GenerationReport, crop_image_to_dir, generate_ad_set,
    generate_ad_set_from_source, generate_sliding_crops,
};
pub use overlay::{OverlayDocument, OverlayRenderer, latest_overlay_json, save_overlay};
pub use text::{CandidateFontResolver, FontChoice, FontResolver, TextPainter, TextPosition};
pub use review::{AnimationClock, CheckedLedger, ReviewSession};
pub use stats::{CtrTestResult, PValueMethod, site_ctr_test};
