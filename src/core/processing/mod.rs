pub mod resize;
pub mod sliding;
pub mod tiler;
