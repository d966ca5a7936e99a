//! Truncated absolute-difference matching cost.

use crate::image::{ImageView, CHANNELS};
use crate::strategy::CostCompute;
use crate::volume::CostVolume;

/// Mean absolute color difference, truncated at a fixed ceiling.
///
/// For disparity `d` the right-image sample is taken at `x - d`, clamped to
/// the left border so every pixel receives a finite cost.
#[derive(Clone, Copy, Debug)]
pub struct AbsDiffCost {
    /// Cost ceiling; `f32::INFINITY` disables truncation.
    pub truncation: f32,
}

impl AbsDiffCost {
    /// Creates a cost with the given truncation ceiling.
    pub fn new(truncation: f32) -> Self {
        Self { truncation }
    }
}

impl Default for AbsDiffCost {
    fn default() -> Self {
        Self {
            truncation: f32::INFINITY,
        }
    }
}

impl CostCompute for AbsDiffCost {
    fn build_cost(
        &self,
        left: ImageView<'_>,
        right: ImageView<'_>,
        max_disparity: usize,
        cost: &mut CostVolume,
    ) {
        let width = cost.width();
        let height = cost.height();
        for d in 1..max_disparity {
            let grid = cost.grid_mut(d).expect("valid disparity grid");
            for y in 0..height {
                let lrow = left.row(y).expect("left row in bounds");
                let rrow = right.row(y).expect("right row in bounds");
                for x in 0..width {
                    let rx = x.saturating_sub(d);
                    let mut acc = 0.0f32;
                    for c in 0..CHANNELS {
                        acc += (lrow[x * CHANNELS + c] - rrow[rx * CHANNELS + c]).abs();
                    }
                    grid[y * width + x] = (acc / CHANNELS as f32).min(self.truncation);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AbsDiffCost;
    use crate::image::ImageView;
    use crate::strategy::CostCompute;
    use crate::volume::CostVolume;

    #[test]
    fn matching_pixels_cost_zero_at_their_disparity() {
        // Right image is the left image shifted one pixel to the left.
        let left = [0.0, 0.0, 0.0, 3.0, 3.0, 3.0, 9.0, 9.0, 9.0];
        let right = [3.0, 3.0, 3.0, 9.0, 9.0, 9.0, 5.0, 5.0, 5.0];
        let lview = ImageView::from_slice(&left, 3, 1).unwrap();
        let rview = ImageView::from_slice(&right, 3, 1).unwrap();

        let mut cost = CostVolume::zeros(2, 3, 1).unwrap();
        AbsDiffCost::default().build_cost(lview, rview, 2, &mut cost);

        assert_eq!(cost.get(1, 0, 1), Some(0.0));
        assert_eq!(cost.get(1, 0, 2), Some(0.0));
        // Border column falls back to the clamped right pixel.
        assert_eq!(cost.get(1, 0, 0), Some(3.0));
    }

    #[test]
    fn truncation_caps_the_cost() {
        let left = [10.0, 10.0, 10.0];
        let right = [0.0, 0.0, 0.0];
        let lview = ImageView::from_slice(&left, 1, 1).unwrap();
        let rview = ImageView::from_slice(&right, 1, 1).unwrap();

        let mut cost = CostVolume::zeros(2, 1, 1).unwrap();
        AbsDiffCost::new(4.0).build_cost(lview, rview, 2, &mut cost);
        assert_eq!(cost.get(1, 0, 0), Some(4.0));
    }
}
