//! One pyramid level: stereo pair, cost volume, and disparity output.
//!
//! A level runs the four-stage pipeline (cost computation, aggregation,
//! winner-take-all selection, post-processing) over its own cost volume, and
//! can blend its costs with the next coarser level as a pyramid is consumed
//! top-down. The level owns its volume exclusively; cross-level fusion is the
//! only other permitted mutator (see [`crate::fusion`]).

use crate::image::{ImageView, OwnedImage};
use crate::pyramid::validate_pair;
use crate::strategy::{CostAggregate, CostCompute, PostProcess};
use crate::trace::{trace_event, trace_span};
use crate::util::math::coarser_cell;
use crate::util::{ScaleFuseError, ScaleFuseResult};
use crate::volume::{CostVolume, DisparityMap};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One resolution tier of the stereo pyramid.
pub struct PyramidLevel {
    left: OwnedImage,
    right: OwnedImage,
    cost: CostVolume,
    disparity: DisparityMap,
    max_disparity: usize,
    disparity_scale: u16,
}

impl PyramidLevel {
    /// Creates a level from a rectified pair, allocating a zeroed cost volume
    /// and disparity map.
    ///
    /// Fails before any allocation if the pair dimensions differ, the
    /// disparity range is empty, or the scale is zero or would push the
    /// largest scaled disparity past `u16::MAX`.
    pub fn new(
        left: OwnedImage,
        right: OwnedImage,
        max_disparity: usize,
        disparity_scale: u16,
    ) -> ScaleFuseResult<Self> {
        if left.width() != right.width() || left.height() != right.height() {
            return Err(ScaleFuseError::MismatchedPair {
                left_width: left.width(),
                left_height: left.height(),
                right_width: right.width(),
                right_height: right.height(),
            });
        }
        if max_disparity < 1 {
            return Err(ScaleFuseError::InvalidDisparityRange { max_disparity });
        }
        let top = (max_disparity as u64 - 1) * disparity_scale as u64;
        if disparity_scale == 0 || top > u16::MAX as u64 {
            return Err(ScaleFuseError::InvalidDisparityScale);
        }
        let cost = CostVolume::zeros(max_disparity, left.width(), left.height())?;
        let disparity = DisparityMap::zeros(left.width(), left.height())?;
        Ok(Self {
            left,
            right,
            cost,
            disparity,
            max_disparity,
            disparity_scale,
        })
    }

    /// Returns the level width in pixels.
    pub fn width(&self) -> usize {
        self.left.width()
    }

    /// Returns the level height in pixels.
    pub fn height(&self) -> usize {
        self.left.height()
    }

    /// Returns the disparity candidate count, including the index-0 sentinel.
    pub fn max_disparity(&self) -> usize {
        self.max_disparity
    }

    /// Returns the factor applied to winning disparity indices.
    pub fn disparity_scale(&self) -> u16 {
        self.disparity_scale
    }

    /// Returns a view of the left (reference) image.
    pub fn left(&self) -> ImageView<'_> {
        self.left.view()
    }

    /// Returns a view of the right (matching) image.
    pub fn right(&self) -> ImageView<'_> {
        self.right.view()
    }

    /// Returns the level's cost volume.
    pub fn cost(&self) -> &CostVolume {
        &self.cost
    }

    /// Returns the level's cost volume mutably.
    pub fn cost_mut(&mut self) -> &mut CostVolume {
        &mut self.cost
    }

    /// Returns the disparity map produced by the last selection pass.
    pub fn disparity(&self) -> &DisparityMap {
        &self.disparity
    }

    /// Populates the cost volume through the given strategy.
    ///
    /// With no strategy the volume keeps its current contents and the skip is
    /// logged; staged pipelines rely on this being a no-op rather than an
    /// error.
    pub fn compute_cost(&mut self, strategy: Option<&dyn CostCompute>) {
        let _span = trace_span!("compute_cost", max_disparity = self.max_disparity).entered();
        match strategy {
            Some(method) => method.build_cost(
                self.left.view(),
                self.right.view(),
                self.max_disparity,
                &mut self.cost,
            ),
            None => trace_event!("compute_cost_skipped"),
        }
    }

    /// Smooths the cost volume in place through the given strategy.
    ///
    /// Same absent-strategy contract as [`Self::compute_cost`].
    pub fn aggregate_cost(&mut self, strategy: Option<&dyn CostAggregate>) {
        let _span = trace_span!("aggregate_cost", max_disparity = self.max_disparity).entered();
        match strategy {
            Some(method) => method.aggregate_cost(
                self.left.view(),
                self.right.view(),
                self.max_disparity,
                &mut self.cost,
            ),
            None => trace_event!("aggregate_cost_skipped"),
        }
    }

    /// Blends this level's costs with the next coarser level's.
    ///
    /// Each cell becomes `alpha * own + (1 - alpha) * coarser` where the
    /// coarser cell is the ceil-halved disparity at the floor-halved pixel.
    /// `alpha = 1` is a pure pass-through regardless of the coarser contents;
    /// `alpha = 0` replaces this level's costs entirely. The coarser volume
    /// must be fully computed and is only read.
    pub fn blend_coarser(&mut self, coarser: &PyramidLevel, alpha: f32) -> ScaleFuseResult<()> {
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(ScaleFuseError::InvalidBlendWeight { alpha });
        }
        validate_pair(self, coarser, 1)?;
        let _span = trace_span!("blend_coarser", alpha = alpha).entered();
        if alpha == 1.0 {
            return Ok(());
        }

        let width = self.width();
        let height = self.height();
        for d in 1..self.max_disparity {
            let grid = self.cost.grid_mut(d).expect("valid disparity grid");
            for y in 0..height {
                for x in 0..width {
                    let (pd, py, px) = coarser_cell(d, y, x);
                    let pulled = coarser.cost.value_clamped(pd, py, px);
                    let idx = y * width + x;
                    grid[idx] = if alpha == 0.0 {
                        pulled
                    } else {
                        alpha * grid[idx] + (1.0 - alpha) * pulled
                    };
                }
            }
        }
        Ok(())
    }

    /// Winner-take-all disparity selection.
    ///
    /// Scans candidates `1..max_disparity` per pixel with a strict less-than
    /// comparison, so the smallest disparity wins ties. The winning index
    /// times the disparity scale lands in the map; pixels with no valid
    /// candidate (`max_disparity <= 1`, or every candidate cost NaN) receive
    /// the 0 sentinel.
    pub fn select_disparity(&mut self) {
        let _span = trace_span!("select_disparity", max_disparity = self.max_disparity).entered();
        let width = self.width();
        let height = self.height();
        let scale = self.disparity_scale;
        let cost = &self.cost;
        for y in 0..height {
            for x in 0..width {
                let winner = winning_disparity(cost, y, x);
                self.disparity.put(x, y, winner as u16 * scale);
            }
        }
    }

    /// Row-parallel winner-take-all, equivalent to [`Self::select_disparity`].
    #[cfg(feature = "rayon")]
    pub fn select_disparity_par(&mut self) {
        let _span = trace_span!(
            "select_disparity",
            max_disparity = self.max_disparity,
            parallel = true
        )
        .entered();
        let width = self.width();
        let scale = self.disparity_scale;
        let cost = &self.cost;
        self.disparity
            .as_mut_slice()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    let winner = winning_disparity(cost, y, x);
                    *out = winner as u16 * scale;
                }
            });
    }

    /// Refines the disparity map in place through the given strategy.
    ///
    /// Same absent-strategy contract as [`Self::compute_cost`].
    pub fn post_process(&mut self, strategy: Option<&dyn PostProcess>) {
        let _span = trace_span!("post_process").entered();
        match strategy {
            Some(method) => method.refine(&mut self.disparity),
            None => trace_event!("post_process_skipped"),
        }
    }
}

/// Index of the minimum-cost candidate at `(x, y)`, or 0 when none qualifies.
fn winning_disparity(cost: &CostVolume, y: usize, x: usize) -> usize {
    let data = cost.as_slice();
    let mut min_cost = f32::INFINITY;
    let mut min_d = 0usize;
    for d in 1..cost.max_disparity() {
        let value = data[cost.index(d, y, x)];
        if value < min_cost {
            min_cost = value;
            min_d = d;
        }
    }
    min_d
}
