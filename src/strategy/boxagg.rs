//! Box-filter cost aggregation.

use crate::image::ImageView;
use crate::strategy::CostAggregate;
use crate::volume::CostVolume;

/// Mean filter over a `(2 * radius + 1)^2` window, applied per disparity grid.
///
/// Windows are clamped at the grid borders, so edge pixels average over the
/// cells that exist.
#[derive(Clone, Copy, Debug)]
pub struct BoxAggregate {
    pub radius: usize,
}

impl BoxAggregate {
    /// Creates a box aggregator with the given window radius.
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }
}

impl Default for BoxAggregate {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl CostAggregate for BoxAggregate {
    fn aggregate_cost(
        &self,
        _left: ImageView<'_>,
        _right: ImageView<'_>,
        max_disparity: usize,
        cost: &mut CostVolume,
    ) {
        if self.radius == 0 {
            return;
        }
        let width = cost.width();
        let height = cost.height();
        let r = self.radius;
        let mut smoothed = vec![0.0f32; width * height];
        for d in 1..max_disparity {
            let grid = cost.grid(d).expect("valid disparity grid");
            for y in 0..height {
                let y0 = y.saturating_sub(r);
                let y1 = (y + r).min(height - 1);
                for x in 0..width {
                    let x0 = x.saturating_sub(r);
                    let x1 = (x + r).min(width - 1);
                    let mut sum = 0.0f32;
                    for wy in y0..=y1 {
                        for wx in x0..=x1 {
                            sum += grid[wy * width + wx];
                        }
                    }
                    let count = ((y1 - y0 + 1) * (x1 - x0 + 1)) as f32;
                    smoothed[y * width + x] = sum / count;
                }
            }
            cost.grid_mut(d)
                .expect("valid disparity grid")
                .copy_from_slice(&smoothed);
        }
    }
}
