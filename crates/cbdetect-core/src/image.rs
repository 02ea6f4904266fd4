use crate::InputError;

/// Smallest width/height accepted by the detector: local-maximum search
/// needs at least a 3x3 neighbourhood.
pub const MIN_IMAGE_SIDE: usize = 3;

/// Borrowed 8-bit grayscale raster.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    /// Wrap a row-major buffer, checking that its length matches the dimensions.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, InputError> {
        let Some(expected) = width.checked_mul(height) else {
            return Err(InputError::InvalidDimensions { width, height });
        };
        if data.len() != expected {
            return Err(InputError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Check that this view can be fed to the corner detector.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.width == 0 || self.height == 0 {
            return Err(InputError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width * self.height;
        if self.data.len() != expected {
            return Err(InputError::InvalidBuffer {
                expected,
                got: self.data.len(),
            });
        }
        if self.width < MIN_IMAGE_SIDE || self.height < MIN_IMAGE_SIDE {
            return Err(InputError::TooSmall {
                width: self.width,
                height: self.height,
                min: MIN_IMAGE_SIDE,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/// Owned 8-bit grayscale raster.
#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    /// Rotate by 90° clockwise. Pixel `(x, y)` moves to `(h - 1 - y, x)`.
    pub fn rotated_cw(&self) -> GrayImage {
        let (w, h) = (self.width, self.height);
        let mut out = GrayImage::new(h, w);
        for y in 0..h {
            for x in 0..w {
                out.data[x * h + (h - 1 - y)] = self.data[y * w + x];
            }
        }
        out
    }
}

/// Single-channel float map (normalised image, filter responses, gradients).
#[derive(Clone, Debug, PartialEq)]
pub struct ImageF32 {
    pub w: usize,
    pub h: usize,
    pub data: Vec<f32>,
}

impl ImageF32 {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    /// Convert a raster to floats, stretching its intensity range to `[0, 1]`.
    ///
    /// Returns `None` for a uniform raster, which carries no corner evidence.
    pub fn from_gray_normalized(src: &GrayImageView<'_>) -> Option<Self> {
        let (lo, hi) = src
            .data
            .iter()
            .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if hi <= lo {
            return None;
        }
        let scale = 1.0 / f32::from(hi - lo);
        let data = src
            .data
            .iter()
            .map(|&v| f32::from(v - lo) * scale)
            .collect();
        Some(Self {
            w: src.width,
            h: src.height,
            data,
        })
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.w + x]
    }

    /// Read with coordinates clamped to the map borders.
    #[inline]
    pub fn at_clamped(&self, x: i32, y: i32) -> f32 {
        let xc = x.clamp(0, self.w as i32 - 1) as usize;
        let yc = y.clamp(0, self.h as i32 - 1) as usize;
        self.data[yc * self.w + xc]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        self.data[y * self.w + x] = v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.w..(y + 1) * self.w]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [f32] {
        &mut self.data[y * self.w..(y + 1) * self.w]
    }

    /// Element-wise maximum with another map of the same size.
    pub fn max_assign(&mut self, other: &ImageF32) {
        debug_assert_eq!((self.w, self.h), (other.w, other.h));
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            if b > *a {
                *a = b;
            }
        }
    }
}

/// Bilinear sample with clamped borders.
#[inline]
pub fn sample_bilinear(src: &ImageF32, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.at_clamped(x0, y0);
    let p10 = src.at_clamped(x0 + 1, y0);
    let p01 = src.at_clamped(x0, y0 + 1);
    let p11 = src.at_clamped(x0 + 1, y0 + 1);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn view_rejects_wrong_buffer_length() {
        let data = vec![0u8; 11];
        let err = GrayImageView::new(4, 3, &data).unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidBuffer {
                expected: 12,
                got: 11
            }
        );
    }

    #[test]
    fn validate_distinguishes_empty_and_thin_rasters() {
        let empty: [u8; 0] = [];
        let view = GrayImageView {
            width: 0,
            height: 5,
            data: &empty,
        };
        assert!(matches!(
            view.validate(),
            Err(InputError::InvalidDimensions { .. })
        ));

        let thin = vec![0u8; 10];
        let view = GrayImageView::new(1, 10, &thin).unwrap();
        assert!(matches!(view.validate(), Err(InputError::TooSmall { .. })));

        let ok = vec![0u8; 9];
        assert!(GrayImageView::new(3, 3, &ok).unwrap().validate().is_ok());
    }

    #[test]
    fn normalization_stretches_to_unit_range() {
        let data = [10u8, 20, 30, 110];
        let view = GrayImageView::new(2, 2, &data).unwrap();
        let f = ImageF32::from_gray_normalized(&view).unwrap();
        assert_relative_eq!(f.at(0, 0), 0.0);
        assert_relative_eq!(f.at(1, 0), 0.1);
        assert_relative_eq!(f.at(1, 1), 1.0);

        let flat = [7u8; 9];
        let view = GrayImageView::new(3, 3, &flat).unwrap();
        assert!(ImageF32::from_gray_normalized(&view).is_none());
    }

    #[test]
    fn rotation_moves_top_left_to_top_right() {
        let mut img = GrayImage::new(3, 2);
        img.data[0] = 255;
        let rot = img.rotated_cw();
        assert_eq!((rot.width, rot.height), (2, 3));
        assert_eq!(rot.data[1], 255);
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let mut f = ImageF32::new(2, 2);
        f.set(1, 0, 1.0);
        f.set(1, 1, 1.0);
        assert_relative_eq!(sample_bilinear(&f, 0.25, 0.5), 0.25);
        assert_relative_eq!(sample_bilinear(&f, 5.0, 0.0), 1.0);
    }
}
