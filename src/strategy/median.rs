//! Median disparity refinement.

use crate::strategy::PostProcess;
use crate::volume::DisparityMap;

/// Square-window median filter over the disparity map.
///
/// Knocks out isolated winner-take-all outliers while keeping values on the
/// original scaled-disparity lattice. Windows are clamped at the borders.
#[derive(Clone, Copy, Debug)]
pub struct MedianPostProcess {
    pub radius: usize,
}

impl MedianPostProcess {
    /// Creates a median filter with the given window radius.
    pub fn new(radius: usize) -> Self {
        Self { radius }
    }
}

impl Default for MedianPostProcess {
    fn default() -> Self {
        Self { radius: 1 }
    }
}

impl PostProcess for MedianPostProcess {
    fn refine(&self, disparity: &mut DisparityMap) {
        if self.radius == 0 {
            return;
        }
        let width = disparity.width();
        let height = disparity.height();
        let r = self.radius;
        let source = disparity.as_slice().to_vec();
        let mut window = Vec::with_capacity((2 * r + 1) * (2 * r + 1));
        for y in 0..height {
            let y0 = y.saturating_sub(r);
            let y1 = (y + r).min(height - 1);
            for x in 0..width {
                let x0 = x.saturating_sub(r);
                let x1 = (x + r).min(width - 1);
                window.clear();
                for wy in y0..=y1 {
                    for wx in x0..=x1 {
                        window.push(source[wy * width + wx]);
                    }
                }
                window.sort_unstable();
                disparity.put(x, y, window[window.len() / 2]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MedianPostProcess;
    use crate::strategy::PostProcess;
    use crate::volume::DisparityMap;

    #[test]
    fn lone_outlier_is_removed() {
        let mut map = DisparityMap::zeros(3, 3).unwrap();
        for v in map.as_mut_slice() {
            *v = 4;
        }
        map.put(1, 1, 60);

        MedianPostProcess::new(1).refine(&mut map);
        assert_eq!(map.get(1, 1), Some(4));
    }

    #[test]
    fn zero_radius_is_a_pass_through() {
        let mut map = DisparityMap::zeros(2, 2).unwrap();
        map.put(0, 1, 8);
        MedianPostProcess::new(0).refine(&mut map);
        assert_eq!(map.get(0, 1), Some(8));
    }
}
