//! Prewitt gradients with magnitude and π-periodic angle.

use cbdetect_core::ImageF32;
use std::f32::consts::PI;

/// Per-pixel gradient buffers of a normalised image.
#[derive(Clone, Debug)]
pub struct GradientField {
    /// Horizontal derivative.
    pub du: ImageF32,
    /// Vertical derivative.
    pub dv: ImageF32,
    /// Gradient angle folded into `[0, π)`.
    pub angle: ImageF32,
    /// Gradient magnitude.
    pub weight: ImageF32,
}

impl GradientField {
    /// 3×3 Prewitt derivatives with border clamping.
    pub fn prewitt(img: &ImageF32) -> Self {
        let (w, h) = (img.w, img.h);
        let mut du = ImageF32::new(w, h);
        let mut dv = ImageF32::new(w, h);
        let mut angle = ImageF32::new(w, h);
        let mut weight = ImageF32::new(w, h);

        for y in 0..h {
            let yi = y as i32;
            for x in 0..w {
                let xi = x as i32;
                let mut gx = 0.0f32;
                let mut gy = 0.0f32;
                for k in -1..=1 {
                    gx += img.at_clamped(xi + 1, yi + k) - img.at_clamped(xi - 1, yi + k);
                    gy += img.at_clamped(xi + k, yi + 1) - img.at_clamped(xi + k, yi - 1);
                }
                du.set(x, y, gx);
                dv.set(x, y, gy);
                weight.set(x, y, gx.hypot(gy));
                angle.set(x, y, fold_pi(gy.atan2(gx)));
            }
        }

        Self {
            du,
            dv,
            angle,
            weight,
        }
    }

    pub fn width(&self) -> usize {
        self.du.w
    }

    pub fn height(&self) -> usize {
        self.du.h
    }
}

/// Wrap an angle into `[0, π)`.
#[inline]
pub(crate) fn fold_pi(a: f32) -> f32 {
    let r = a.rem_euclid(PI);
    if r >= PI {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertical_step_has_horizontal_gradient() {
        let mut img = ImageF32::new(6, 5);
        for y in 0..5 {
            for x in 3..6 {
                img.set(x, y, 1.0);
            }
        }
        let g = GradientField::prewitt(&img);
        assert_relative_eq!(g.du.at(2, 2), 3.0);
        assert_relative_eq!(g.du.at(3, 2), 3.0);
        assert_relative_eq!(g.dv.at(2, 2), 0.0);
        assert_relative_eq!(g.angle.at(2, 2), 0.0);
        assert_relative_eq!(g.weight.at(0, 2), 0.0);
    }

    #[test]
    fn angles_fold_into_half_turn() {
        assert_relative_eq!(fold_pi(-PI / 2.0), PI / 2.0, epsilon = 1e-6);
        assert_relative_eq!(fold_pi(PI), 0.0, epsilon = 1e-6);
        assert!(fold_pi(3.0 * PI - 1e-3) < PI);
    }
}
