//! Cross-scale fusion of cost volumes.
//!
//! Fusion blends every level's matching costs through the inverted
//! scale-smoothness regularizer. The reduced mode rewrites only the finest
//! level (the production path, since only its disparity output is consumed
//! downstream); the full mode rewrites every level and exists for diagnostic
//! inspection of coarser tiers.

use crate::level::PyramidLevel;
use crate::pyramid::validate_chain;
use crate::trace::trace_span;
use crate::util::math::coarser_cell;
use crate::util::ScaleFuseResult;
use crate::volume::CostVolume;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub mod weights;

pub use weights::RegularizationWeights;

/// Orchestrates cross-scale fusion over a finest-first pyramid.
#[derive(Clone, Copy, Debug)]
pub struct PyramidFuser {
    /// Smoothness strength of the scale regularizer; 0 disables coupling.
    pub lambda: f64,
    /// Use row-parallel sweeps where available (takes effect with the `rayon`
    /// feature; the scalar path runs otherwise).
    pub parallel: bool,
}

impl PyramidFuser {
    /// Creates a scalar fuser with the given smoothness strength.
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            parallel: false,
        }
    }

    /// Fuses every level's costs into the finest level's volume.
    ///
    /// For each cell of the finest volume, the weighted sum over all scales
    /// (row 0 of the weight matrix, coordinates remapped level by level)
    /// replaces the cell. Each cell reads its own pre-fusion value exactly
    /// once and is written exactly once after the full sum is accumulated;
    /// coarser levels are never written. Validation and weight construction
    /// happen before any cell is touched, so a failed call leaves every
    /// volume unchanged.
    pub fn fuse_finest(&self, levels: &mut [PyramidLevel]) -> ScaleFuseResult<()> {
        validate_chain(levels)?;
        let weights = RegularizationWeights::new(levels.len(), self.lambda)?;
        let _span = trace_span!(
            "fuse_finest",
            levels = levels.len(),
            lambda = self.lambda
        )
        .entered();

        #[cfg(feature = "rayon")]
        if self.parallel {
            return fuse_finest_par(levels, &weights);
        }
        fuse_finest_seq(levels, &weights)
    }

    /// Fuses every level's costs into every level's volume.
    ///
    /// Each target level receives its weight row scattered back through the
    /// same scale remapping, walking the finest grid in disparity-row-column
    /// order; where several fine cells land on one coarser cell the last
    /// write wins, and coarser cells never reached by the walk are left at
    /// zero. All sums read the pre-fusion volumes; the rewrite happens only
    /// after every target buffer is complete.
    pub fn fuse_all(&self, levels: &mut [PyramidLevel]) -> ScaleFuseResult<()> {
        validate_chain(levels)?;
        let weights = RegularizationWeights::new(levels.len(), self.lambda)?;
        let _span = trace_span!("fuse_all", levels = levels.len(), lambda = self.lambda).entered();

        let mut fused = Vec::with_capacity(levels.len());
        for level in levels.iter() {
            fused.push(CostVolume::zeros(
                level.max_disparity(),
                level.width(),
                level.height(),
            )?);
        }

        let width = levels[0].width();
        let height = levels[0].height();
        let max_disparity = levels[0].max_disparity();
        for d in 1..max_disparity {
            for y in 0..height {
                for x in 0..width {
                    for (m, target) in fused.iter_mut().enumerate() {
                        let row = weights.row(m).expect("target level within depth");
                        let mut sum = 0.0f64;
                        let (mut cd, mut cy, mut cx) = (d, y, x);
                        let (mut ad, mut ay, mut ax) = (d, y, x);
                        for (s, level) in levels.iter().enumerate() {
                            if s == m {
                                (ad, ay, ax) = (cd, cy, cx);
                            }
                            sum += row[s] * f64::from(level.cost().value_clamped(cd, cy, cx));
                            (cd, cy, cx) = coarser_cell(cd, cy, cx);
                        }
                        let ad = ad.min(target.max_disparity() - 1);
                        let ay = ay.min(target.height() - 1);
                        let ax = ax.min(target.width() - 1);
                        target.set(ad, ay, ax, sum as f32);
                    }
                }
            }
        }

        for (level, volume) in levels.iter_mut().zip(fused) {
            *level.cost_mut() = volume;
        }
        Ok(())
    }
}

/// Weighted sum over all scales for one finest-level cell.
///
/// `own` is the cell's pre-fusion value (the scale-0 term); coarser terms are
/// read through the shared remapping, clamped into each level's bounds.
fn fused_cost(
    own: f32,
    coarser: &[PyramidLevel],
    row: &[f64],
    d: usize,
    y: usize,
    x: usize,
) -> f32 {
    let mut sum = row[0] * f64::from(own);
    let (mut cd, mut cy, mut cx) = coarser_cell(d, y, x);
    for (s, level) in coarser.iter().enumerate() {
        sum += row[s + 1] * f64::from(level.cost().value_clamped(cd, cy, cx));
        (cd, cy, cx) = coarser_cell(cd, cy, cx);
    }
    sum as f32
}

fn fuse_finest_seq(
    levels: &mut [PyramidLevel],
    weights: &RegularizationWeights,
) -> ScaleFuseResult<()> {
    let row0 = weights.row(0).expect("weights match pyramid depth");
    let (finest, coarser) = levels.split_first_mut().expect("validated non-empty");
    let width = finest.width();
    let height = finest.height();
    let max_disparity = finest.max_disparity();
    let volume = finest.cost_mut();
    for d in 1..max_disparity {
        for y in 0..height {
            for x in 0..width {
                let idx = volume.index(d, y, x);
                let own = volume.as_slice()[idx];
                volume.as_mut_slice()[idx] = fused_cost(own, coarser, row0, d, y, x);
            }
        }
    }
    Ok(())
}

/// Row-parallel reduced fusion, equivalent to the scalar path.
///
/// Rows of the finest volume are written exclusively by their owning task;
/// coarser levels are shared read-only for the sweep's duration.
#[cfg(feature = "rayon")]
fn fuse_finest_par(
    levels: &mut [PyramidLevel],
    weights: &RegularizationWeights,
) -> ScaleFuseResult<()> {
    let row0 = weights.row(0).expect("weights match pyramid depth");
    let (finest, coarser) = levels.split_first_mut().expect("validated non-empty");
    let width = finest.width();
    let height = finest.height();
    let coarser = &*coarser;
    finest
        .cost_mut()
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(chunk, cells)| {
            let d = chunk / height;
            let y = chunk % height;
            if d == 0 {
                return;
            }
            for (x, cell) in cells.iter_mut().enumerate() {
                *cell = fused_cost(*cell, coarser, row0, d, y, x);
            }
        });
    Ok(())
}
