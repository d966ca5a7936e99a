//! Image views and owned buffers for rectified stereo pairs.
//!
//! Pixels are 3-channel `f32`, stored interleaved. `ImageView` is a borrowed
//! 2D view into a 1D buffer with an explicit stride; the stride counts pixels
//! between the starts of consecutive rows, so a stride larger than the width
//! represents padded rows.

use crate::util::{ScaleFuseError, ScaleFuseResult};

#[cfg(feature = "image-io")]
pub mod io;

/// Interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// Borrowed 2D view over interleaved 3-channel `f32` pixels.
#[derive(Copy, Clone)]
pub struct ImageView<'a> {
    data: &'a [f32],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> ImageView<'a> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [f32], width: usize, height: usize) -> ScaleFuseResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride (counted in pixels).
    pub fn new(
        data: &'a [f32],
        width: usize,
        height: usize,
        stride: usize,
    ) -> ScaleFuseResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(ScaleFuseError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in pixels between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns the channels of the pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&'a [f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.stride + x) * CHANNELS;
        self.data.get(idx..idx + CHANNELS)
    }

    /// Returns a contiguous slice for row `y` holding `width * CHANNELS` values.
    pub fn row(&self, y: usize) -> Option<&'a [f32]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride * CHANNELS;
        let end = start + self.width * CHANNELS;
        self.data.get(start..end)
    }
}

/// Owned contiguous 3-channel `f32` image buffer.
#[derive(Clone)]
pub struct OwnedImage {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Takes ownership of an interleaved buffer of exactly
    /// `width * height * CHANNELS` values.
    pub fn from_vec(data: Vec<f32>, width: usize, height: usize) -> ScaleFuseResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScaleFuseError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(CHANNELS))
            .ok_or(ScaleFuseError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(ScaleFuseError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(ScaleFuseError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Copies a borrowed view into a contiguous owned image.
    pub fn from_view(view: ImageView<'_>) -> ScaleFuseResult<Self> {
        let width = view.width();
        let height = view.height();
        let row_len = width * CHANNELS;
        let mut data = vec![0.0f32; width * height * CHANNELS];
        for y in 0..height {
            let row = view.row(y).ok_or(ScaleFuseError::BufferTooSmall {
                needed: (y * view.stride() + width) * CHANNELS,
                got: view.as_slice().len(),
            })?;
            data[y * row_len..(y + 1) * row_len].copy_from_slice(row);
        }
        Self::from_vec(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> ScaleFuseResult<usize> {
    if width == 0 || height == 0 {
        return Err(ScaleFuseError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(ScaleFuseError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or(ScaleFuseError::InvalidDimensions { width, height })?;
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::{ImageView, OwnedImage, CHANNELS};
    use crate::util::ScaleFuseError;

    #[test]
    fn view_rejects_zero_dimensions() {
        let data = [0.0f32; 12];
        let err = ImageView::from_slice(&data, 0, 2).err().unwrap();
        assert_eq!(
            err,
            ScaleFuseError::InvalidDimensions {
                width: 0,
                height: 2,
            }
        );
    }

    #[test]
    fn view_rejects_short_buffer() {
        let data = [0.0f32; 9];
        let err = ImageView::from_slice(&data, 2, 2).err().unwrap();
        assert_eq!(err, ScaleFuseError::BufferTooSmall { needed: 12, got: 9 });
    }

    #[test]
    fn strided_view_addresses_pixels() {
        // 2x2 image padded to stride 3
        let mut data = vec![0.0f32; 3 * 2 * CHANNELS];
        for (i, v) in data.iter_mut().enumerate() {
            *v = i as f32;
        }
        let view = ImageView::new(&data, 2, 2, 3).unwrap();
        assert_eq!(view.pixel(1, 1).unwrap(), &data[12..15]);
        assert_eq!(view.row(1).unwrap(), &data[9..15]);
        assert!(view.pixel(2, 0).is_none());
    }

    #[test]
    fn owned_image_round_trips_strided_view() {
        let data: Vec<f32> = (0..3 * 2 * CHANNELS).map(|v| v as f32).collect();
        let view = ImageView::new(&data, 2, 2, 3).unwrap();
        let owned = OwnedImage::from_view(view).unwrap();
        assert_eq!(owned.view().row(0).unwrap(), &data[0..6]);
        assert_eq!(owned.view().row(1).unwrap(), &data[9..15]);
    }
}
