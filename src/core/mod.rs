//! Core building blocks: the ad-size catalog, crop/pan geometry, generation
//! parameters, and the raster processing steps built on them. These are
//! primitives consumed by the high-level `api` module.
pub mod catalog;
pub mod geometry;
pub mod params;
pub mod processing;
