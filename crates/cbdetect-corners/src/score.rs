//! Corner scoring by gradient and intensity template agreement.

use crate::filter_bank::{saddle_response, CorrelationTemplate};
use crate::gradient::GradientField;
use cbdetect_core::{sample_bilinear, ImageF32};
use nalgebra::{Point2, Vector2};

/// Pixels within this distance of an edge line are expected to carry
/// strong gradients.
const EDGE_MASK_WIDTH: f32 = 1.5;

/// Score a refined corner at `p` with edge directions `v1`, `v2`.
///
/// For each radius whose window fits inside the image the score is the
/// product of
/// - the normalised correlation between the gradient magnitude patch and a
///   `±1` mask that is positive along both edge lines, and
/// - the saddle response of an intensity template aligned with `v1`/`v2`,
///
/// each clamped at zero. The best radius wins; the result lies in `[0, 1]`.
pub fn corner_score(
    img: &ImageF32,
    grad: &GradientField,
    p: Point2<f32>,
    v1: Vector2<f32>,
    v2: Vector2<f32>,
    radii: &[usize],
) -> f32 {
    let mut best = 0.0f32;
    for &r in radii {
        let rf = r as f32;
        let fits = p.x - rf >= 0.0
            && p.y - rf >= 0.0
            && p.x + rf <= (img.w - 1) as f32
            && p.y + rf <= (img.h - 1) as f32;
        if r == 0 || !fits {
            continue;
        }

        let gradient = gradient_score(grad, p, v1, v2, r).max(0.0);
        if gradient <= 0.0 {
            continue;
        }
        let template = CorrelationTemplate::from_directions(&v1, &v2, r);
        let intensity = saddle_response(template.quadrant_means_at(img, p)).max(0.0);
        best = best.max(gradient * intensity);
    }
    best.clamp(0.0, 1.0)
}

/// Normalised cross-correlation of gradient magnitudes with the edge mask.
fn gradient_score(
    grad: &GradientField,
    p: Point2<f32>,
    v1: Vector2<f32>,
    v2: Vector2<f32>,
    r: usize,
) -> f32 {
    let r = r as i32;
    let side = (2 * r + 1) as usize;
    let n = side * side;
    let mut patch = Vec::with_capacity(n);
    let mut mask = Vec::with_capacity(n);

    for dy in -r..=r {
        for dx in -r..=r {
            let w = Vector2::new(dx as f32, dy as f32);
            let d1 = (w - w.dot(&v1) * v1).norm();
            let d2 = (w - w.dot(&v2) * v2).norm();
            let on_edge = d1 <= EDGE_MASK_WIDTH || d2 <= EDGE_MASK_WIDTH;
            mask.push(if on_edge { 1.0 } else { -1.0 });
            patch.push(sample_bilinear(
                &grad.weight,
                p.x + dx as f32,
                p.y + dy as f32,
            ));
        }
    }

    let (Some(patch), Some(mask)) = (standardize(&patch), standardize(&mask)) else {
        return 0.0;
    };
    let dot: f32 = patch.iter().zip(&mask).map(|(a, b)| a * b).sum();
    dot / (n as f32 - 1.0)
}

/// Zero mean, unit sample standard deviation. `None` for a constant input.
fn standardize(values: &[f32]) -> Option<Vec<f32>> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f32>() / n as f32;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / (n as f32 - 1.0);
    let std = var.sqrt();
    if std <= 1e-6 {
        return None;
    }
    Some(values.iter().map(|v| (v - mean) / std).collect())
}
