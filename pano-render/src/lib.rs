//! Panorama synthesis and comparison for pose search.
//!
//! This crate turns an oriented point cloud into an equirectangular
//! [`Panorama`], resamples panoramas and per-patch tensors through rotation
//! [`SamplingGrid`](pano_core::SamplingGrid)s, and provides the patch
//! histogram primitives used to compare a synthetic panorama with a real one.

mod color;
mod histogram;
mod occlusion;
mod panorama;
mod render;
pub mod sample;

pub use color::*;
pub use histogram::*;
pub use occlusion::*;
pub use panorama::*;
pub use render::*;
pub use sample::{sample, warp, Interpolation, Padding};
