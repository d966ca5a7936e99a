//! Stereo pyramid construction and shape validation.
//!
//! Levels are ordered finest first. Each coarser level floor-halves the
//! dimensions and ceil-halves the disparity candidate count, which is the
//! shape contract the blend and fusion paths assume. Downsampling uses a 2x2
//! box filter per channel.

use crate::image::{ImageView, OwnedImage, CHANNELS};
use crate::level::PyramidLevel;
use crate::trace::trace_span;
use crate::util::{ScaleFuseError, ScaleFuseResult};

/// Builds a stereo pyramid from a rectified base pair.
///
/// `max_levels` is clamped to at least 1 so the base level is always present;
/// construction stops early once a dimension would fall below 2 pixels. Every
/// level shares the same disparity scale.
pub fn build_pyramid(
    left: ImageView<'_>,
    right: ImageView<'_>,
    max_disparity: usize,
    disparity_scale: u16,
    max_levels: usize,
) -> ScaleFuseResult<Vec<PyramidLevel>> {
    let _span = trace_span!("build_pyramid", max_levels = max_levels).entered();
    let max_levels = max_levels.max(1);
    let mut levels = Vec::new();
    levels.push(PyramidLevel::new(
        OwnedImage::from_view(left)?,
        OwnedImage::from_view(right)?,
        max_disparity,
        disparity_scale,
    )?);

    while levels.len() < max_levels {
        let prev = levels.last().expect("levels is not empty");
        if prev.width() < 2 || prev.height() < 2 {
            break;
        }
        let next_max_disparity = (prev.max_disparity() + 1) / 2;
        let left = downsample_half(prev.left())?;
        let right = downsample_half(prev.right())?;
        levels.push(PyramidLevel::new(
            left,
            right,
            next_max_disparity,
            disparity_scale,
        )?);
    }

    Ok(levels)
}

/// Checks the halving chain over a finest-first level sequence.
///
/// Blend and fusion results are only meaningful for pyramids that satisfy
/// this contract; both validate through here before touching any volume.
pub fn validate_chain(levels: &[PyramidLevel]) -> ScaleFuseResult<()> {
    if levels.is_empty() {
        return Err(ScaleFuseError::EmptyPyramid);
    }
    for (index, pair) in levels.windows(2).enumerate() {
        validate_pair(&pair[0], &pair[1], index + 1)?;
    }
    Ok(())
}

pub(crate) fn validate_pair(
    finer: &PyramidLevel,
    coarser: &PyramidLevel,
    level: usize,
) -> ScaleFuseResult<()> {
    if coarser.width() != finer.width() / 2 {
        return Err(ScaleFuseError::PyramidShape {
            level,
            context: "width is not half the finer level's",
        });
    }
    if coarser.height() != finer.height() / 2 {
        return Err(ScaleFuseError::PyramidShape {
            level,
            context: "height is not half the finer level's",
        });
    }
    if coarser.max_disparity() != (finer.max_disparity() + 1) / 2 {
        return Err(ScaleFuseError::PyramidShape {
            level,
            context: "max disparity is not the ceil-half of the finer level's",
        });
    }
    Ok(())
}

fn downsample_half(src: ImageView<'_>) -> ScaleFuseResult<OwnedImage> {
    let dst_width = src.width() / 2;
    let dst_height = src.height() / 2;
    let mut data = vec![0.0f32; dst_width * dst_height * CHANNELS];
    for y in 0..dst_height {
        let row0 = src.row(2 * y).expect("source row in bounds");
        let row1 = src.row(2 * y + 1).expect("source row in bounds");
        for x in 0..dst_width {
            for c in 0..CHANNELS {
                let sum = row0[2 * x * CHANNELS + c]
                    + row0[(2 * x + 1) * CHANNELS + c]
                    + row1[2 * x * CHANNELS + c]
                    + row1[(2 * x + 1) * CHANNELS + c];
                data[(y * dst_width + x) * CHANNELS + c] = 0.25 * sum;
            }
        }
    }
    OwnedImage::from_vec(data, dst_width, dst_height)
}

#[cfg(test)]
mod tests {
    use super::{build_pyramid, validate_chain};
    use crate::image::{ImageView, CHANNELS};

    fn gradient(width: usize, height: usize) -> Vec<f32> {
        let mut data = Vec::with_capacity(width * height * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                for c in 0..CHANNELS {
                    data.push((x + y * width + c) as f32);
                }
            }
        }
        data
    }

    #[test]
    fn pyramid_halves_dimensions_and_disparities() {
        let data = gradient(8, 6);
        let view = ImageView::from_slice(&data, 8, 6).unwrap();
        let levels = build_pyramid(view, view, 9, 1, 3).unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!((levels[1].width(), levels[1].height()), (4, 3));
        assert_eq!((levels[2].width(), levels[2].height()), (2, 1));
        assert_eq!(levels[1].max_disparity(), 5);
        assert_eq!(levels[2].max_disparity(), 3);
        validate_chain(&levels).unwrap();
    }

    #[test]
    fn pyramid_stops_before_degenerate_levels() {
        let data = gradient(4, 2);
        let view = ImageView::from_slice(&data, 4, 2).unwrap();
        let levels = build_pyramid(view, view, 3, 1, 10).unwrap();

        // 4x2 -> 2x1; a 2x1 level cannot halve again.
        assert_eq!(levels.len(), 2);
    }

    #[test]
    fn downsampling_averages_quads() {
        // Two rows of two pixels, channel 0 values 0, 2, 4, 6.
        let mut data = vec![0.0f32; 2 * 2 * CHANNELS];
        for (i, px) in [0.0f32, 2.0, 4.0, 6.0].iter().enumerate() {
            data[i * CHANNELS] = *px;
        }
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let levels = build_pyramid(view, view, 2, 1, 2).unwrap();

        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].left().pixel(0, 0).unwrap()[0], 3.0);
    }
}
