//! Scalefuse estimates per-pixel stereo disparity with a multi-resolution
//! cost-volume pipeline.
//!
//! Each pyramid level owns a dense cost volume over its candidate
//! disparities; photo-consistency, aggregation, and refinement plug in
//! through one-method strategy traits. Cost information crosses scales either
//! pairwise ([`PyramidLevel::blend_coarser`]) or globally through
//! [`PyramidFuser`], whose weights come from inverting a tridiagonal
//! scale-smoothness regularizer. Winner-take-all selection then produces the
//! disparity map. Optional parallelism is available via the `rayon` feature.

pub mod export;
pub mod fusion;
pub mod image;
pub mod level;
pub mod pyramid;
pub mod strategy;
mod trace;
pub mod util;
pub mod volume;

pub use fusion::{PyramidFuser, RegularizationWeights};
pub use image::{ImageView, OwnedImage};
pub use level::PyramidLevel;
pub use pyramid::{build_pyramid, validate_chain};
pub use strategy::{
    AbsDiffCost, BoxAggregate, CostAggregate, CostCompute, MedianPostProcess, PostProcess,
};
pub use util::{ScaleFuseError, ScaleFuseResult};
pub use volume::{CostVolume, DisparityMap};
