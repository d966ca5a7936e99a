//! Pluggable pipeline stages.
//!
//! The pipeline invokes each stage through a one-method trait and accepts
//! `Option<&dyn …>`; an absent stage is a logged no-op so partial pipelines
//! can run during staged bring-up. Implementations operate in place and must
//! not change array shapes.

use crate::image::ImageView;
use crate::volume::{CostVolume, DisparityMap};

mod absdiff;
mod boxagg;
mod median;

pub use absdiff::AbsDiffCost;
pub use boxagg::BoxAggregate;
pub use median::MedianPostProcess;

/// Photo-consistency cost computation.
///
/// Populates every valid disparity grid (`1..max_disparity`) of a
/// zero-initialized volume from the rectified pair.
pub trait CostCompute {
    fn build_cost(
        &self,
        left: ImageView<'_>,
        right: ImageView<'_>,
        max_disparity: usize,
        cost: &mut CostVolume,
    );
}

/// Spatial cost aggregation over an already-populated volume.
pub trait CostAggregate {
    fn aggregate_cost(
        &self,
        left: ImageView<'_>,
        right: ImageView<'_>,
        max_disparity: usize,
        cost: &mut CostVolume,
    );
}

/// Disparity-map refinement after winner-take-all selection.
pub trait PostProcess {
    fn refine(&self, disparity: &mut DisparityMap);
}
