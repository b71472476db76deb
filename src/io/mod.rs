//! I/O layer: master-image loading and discovery (`source`), and `writers`
//! for static PNG/JPEG frames, looping GIF pans and JSON manifests.
pub mod source;
pub use source::{collect_images, load_source};

pub mod writers;
