//! Saddle-point correlation templates.
//!
//! A template splits a `(2r+1)²` window with two lines through its centre
//! (the hypothesised edges) into four quadrant kernels. Opposite quadrants
//! `a1/a2` and `b1/b2` must share a colour, and the two pairs must differ:
//!
//! ```text
//!   b1 | a1
//!  ----+----
//!   a2 | b2
//! ```
//!
//! Kernel weights follow a Gaussian of the distance to the centre
//! (`σ = r/2`) and are normalised to unit sum, so correlating a kernel
//! yields a weighted mean intensity of its quadrant.

use cbdetect_core::{sample_bilinear, ImageF32};
use nalgebra::{Point2, Vector2};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Pixels closer than this to either template line belong to no quadrant.
const LINE_DEAD_ZONE: f32 = 0.1;

#[derive(Clone, Copy, Debug)]
struct Tap {
    dx: i32,
    dy: i32,
    w: f32,
}

/// One saddle template at a fixed orientation pair and radius.
#[derive(Clone, Debug)]
pub struct CorrelationTemplate {
    pub angles: [f32; 2],
    pub radius: usize,
    kernels: [Vec<Tap>; 4], // a1, a2, b1, b2
}

impl CorrelationTemplate {
    pub fn new(angle1: f32, angle2: f32, radius: usize) -> Self {
        let r = radius as i32;
        let sigma = (radius as f32 / 2.0).max(0.5);
        let n1 = Vector2::new(-angle1.sin(), angle1.cos());
        let n2 = Vector2::new(-angle2.sin(), angle2.cos());

        let mut kernels: [Vec<Tap>; 4] = Default::default();
        for dy in -r..=r {
            for dx in -r..=r {
                let vec = Vector2::new(dx as f32, dy as f32);
                let s1 = vec.dot(&n1);
                let s2 = vec.dot(&n2);
                let slot = if s1 <= -LINE_DEAD_ZONE && s2 <= -LINE_DEAD_ZONE {
                    0
                } else if s1 >= LINE_DEAD_ZONE && s2 >= LINE_DEAD_ZONE {
                    1
                } else if s1 <= -LINE_DEAD_ZONE && s2 >= LINE_DEAD_ZONE {
                    2
                } else if s1 >= LINE_DEAD_ZONE && s2 <= -LINE_DEAD_ZONE {
                    3
                } else {
                    continue;
                };
                let d2 = vec.norm_squared();
                let w = (-d2 / (2.0 * sigma * sigma)).exp();
                kernels[slot].push(Tap { dx, dy, w });
            }
        }

        for kernel in kernels.iter_mut() {
            let sum: f32 = kernel.iter().map(|t| t.w).sum();
            if sum > 0.0 {
                kernel.iter_mut().for_each(|t| t.w /= sum);
            }
        }

        Self {
            angles: [angle1, angle2],
            radius,
            kernels,
        }
    }

    /// Template aligned with two edge directions.
    pub fn from_directions(v1: &Vector2<f32>, v2: &Vector2<f32>, radius: usize) -> Self {
        Self::new(v1.y.atan2(v1.x), v2.y.atan2(v2.x), radius)
    }

    /// Quadrant means `[a1, a2, b1, b2]` centred on pixel `(x, y)`.
    #[inline]
    pub fn quadrant_means(&self, img: &ImageF32, x: usize, y: usize) -> [f32; 4] {
        let r = self.radius;
        let inside = x >= r && y >= r && x + r < img.w && y + r < img.h;
        let mut out = [0.0f32; 4];
        if inside {
            let (cx, cy) = (x as i32, y as i32);
            for (m, kernel) in out.iter_mut().zip(&self.kernels) {
                *m = kernel
                    .iter()
                    .map(|t| t.w * img.data[(cy + t.dy) as usize * img.w + (cx + t.dx) as usize])
                    .sum();
            }
        } else {
            let (cx, cy) = (x as i32, y as i32);
            for (m, kernel) in out.iter_mut().zip(&self.kernels) {
                *m = kernel
                    .iter()
                    .map(|t| t.w * img.at_clamped(cx + t.dx, cy + t.dy))
                    .sum();
            }
        }
        out
    }

    /// Quadrant means centred on a sub-pixel position (bilinear sampling).
    pub fn quadrant_means_at(&self, img: &ImageF32, p: Point2<f32>) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (m, kernel) in out.iter_mut().zip(&self.kernels) {
            *m = kernel
                .iter()
                .map(|t| t.w * sample_bilinear(img, p.x + t.dx as f32, p.y + t.dy as f32))
                .sum();
        }
        out
    }
}

/// Saddle response from quadrant means `[a1, a2, b1, b2]`, for both colour
/// polarities. Positive only when both diagonals agree internally and
/// differ from each other.
#[inline]
pub fn saddle_response(means: [f32; 4]) -> f32 {
    let [a1, a2, b1, b2] = means;
    let mu = 0.25 * (a1 + a2 + b1 + b2);

    // a light, b dark
    let light_a = (a1 - mu).min(a2 - mu).min((mu - b1).min(mu - b2));
    // a dark, b light
    let dark_a = (mu - a1).min(mu - a2).min((b1 - mu).min(b2 - mu));
    light_a.max(dark_a)
}

/// Fixed set of templates scoring every pixel for corner-likeness.
#[derive(Clone, Debug)]
pub struct FilterBank {
    templates: Vec<CorrelationTemplate>,
}

impl FilterBank {
    /// Build every angle pair at every radius.
    pub fn new(angles: &[[f32; 2]], radii: &[usize]) -> Self {
        let templates = radii
            .iter()
            .flat_map(|&r| {
                angles
                    .iter()
                    .map(move |&[a1, a2]| CorrelationTemplate::new(a1, a2, r))
            })
            .collect();
        Self { templates }
    }

    pub fn templates(&self) -> &[CorrelationTemplate] {
        &self.templates
    }

    /// One response map per template.
    pub fn responses(&self, img: &ImageF32) -> Vec<ImageF32> {
        self.templates
            .iter()
            .map(|t| {
                let mut out = ImageF32::new(img.w, img.h);
                for y in 0..img.h {
                    let row = out.row_mut(y);
                    for (x, v) in row.iter_mut().enumerate() {
                        *v = saddle_response(t.quadrant_means(img, x, y));
                    }
                }
                out
            })
            .collect()
    }

    /// Per-pixel maximum of all template responses, clamped at zero.
    pub fn likelihood(&self, img: &ImageF32) -> ImageF32 {
        let mut out = ImageF32::new(img.w, img.h);
        if img.w == 0 || img.h == 0 {
            return out;
        }

        #[cfg(feature = "rayon")]
        out.data
            .par_chunks_mut(img.w)
            .enumerate()
            .for_each(|(y, row)| self.likelihood_row(img, y, row));

        #[cfg(not(feature = "rayon"))]
        out.data
            .chunks_mut(img.w)
            .enumerate()
            .for_each(|(y, row)| self.likelihood_row(img, y, row));

        out
    }

    fn likelihood_row(&self, img: &ImageF32, y: usize, row: &mut [f32]) {
        for (x, v) in row.iter_mut().enumerate() {
            let mut best = 0.0f32;
            for t in &self.templates {
                best = best.max(saddle_response(t.quadrant_means(img, x, y)));
            }
            *v = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn quadrant_image(size: usize, flip: bool) -> ImageF32 {
        let mut img = ImageF32::new(size, size);
        let c = size as f32 / 2.0 - 0.5;
        for y in 0..size {
            for x in 0..size {
                let right = x as f32 > c;
                let below = y as f32 > c;
                let light = (right != below) ^ flip;
                img.set(x, y, if light { 1.0 } else { 0.0 });
            }
        }
        img
    }

    #[test]
    fn kernels_are_normalised_and_disjoint() {
        let t = CorrelationTemplate::new(0.0, FRAC_PI_2, 4);
        for k in &t.kernels {
            assert!(!k.is_empty());
            let sum: f32 = k.iter().map(|t| t.w).sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
            assert!(k.iter().all(|t| t.dx != 0 && t.dy != 0));
        }
    }

    #[test]
    fn saddle_response_is_polarity_invariant() {
        assert_relative_eq!(saddle_response([1.0, 1.0, 0.0, 0.0]), 0.5);
        assert_relative_eq!(saddle_response([0.0, 0.0, 1.0, 1.0]), 0.5);
        // a straight edge: one diagonal disagrees internally
        assert!(saddle_response([1.0, 0.0, 1.0, 0.0]) < 0.0);
        assert_relative_eq!(saddle_response([0.3; 4]), 0.0);
    }

    #[test]
    fn likelihood_peaks_at_the_saddle() {
        let img = quadrant_image(32, false);
        let bank = FilterBank::new(&[[0.0, FRAC_PI_2]], &[4, 8]);
        let lik = bank.likelihood(&img);
        let (mut best, mut at) = (0.0f32, (0, 0));
        for y in 0..lik.h {
            for x in 0..lik.w {
                if lik.at(x, y) > best {
                    best = lik.at(x, y);
                    at = (x, y);
                }
            }
        }
        assert!(best > 0.4, "peak response {best}");
        assert!((15..=16).contains(&at.0) && (15..=16).contains(&at.1));

        let flipped = bank.likelihood(&quadrant_image(32, true));
        assert_relative_eq!(flipped.at(at.0, at.1), best, epsilon = 1e-5);
    }

    #[test]
    fn bank_builds_every_angle_at_every_radius() {
        let bank = FilterBank::new(&[[0.0, FRAC_PI_2], [0.7, -0.7]], &[4, 8, 12]);
        assert_eq!(bank.templates().len(), 6);
        let responses = bank.responses(&quadrant_image(12, false));
        assert_eq!(responses.len(), 6);
    }
}
