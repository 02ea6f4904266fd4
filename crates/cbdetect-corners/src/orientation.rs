//! Initial edge directions from a weighted histogram of edge angles.

use crate::gradient::{fold_pi, GradientField};
use nalgebra::Vector2;
use std::f32::consts::{FRAC_PI_2, PI};

/// Estimate the two dominant edge directions around pixel `(cx, cy)`.
///
/// Edge angles (gradient angle + π/2, modulo π) inside a window of half-size
/// `radius` are accumulated into `bins` bins weighted by gradient magnitude.
/// The two strongest modes of the smoothed histogram become the edge
/// directions, sorted by angle. Returns `None` when fewer than two modes
/// exist or the modes are within `min_angle` radians of each other.
pub fn edge_orientations(
    grad: &GradientField,
    cx: usize,
    cy: usize,
    radius: usize,
    bins: usize,
    min_angle: f32,
) -> Option<(Vector2<f32>, Vector2<f32>)> {
    if bins < 2 {
        return None;
    }
    let x0 = cx.saturating_sub(radius);
    let y0 = cy.saturating_sub(radius);
    let x1 = (cx + radius).min(grad.width() - 1);
    let y1 = (cy + radius).min(grad.height() - 1);

    let bin_width = PI / bins as f32;
    let mut hist = vec![0.0f32; bins];
    for y in y0..=y1 {
        for x in x0..=x1 {
            let edge_angle = fold_pi(grad.angle.at(x, y) + FRAC_PI_2);
            let bin = ((edge_angle / bin_width) as usize).min(bins - 1);
            hist[bin] += grad.weight.at(x, y);
        }
    }

    let modes = find_histogram_modes(&hist, 1.0);
    if modes.len() < 2 {
        return None;
    }

    let mut angles = [
        (modes[0].0 as f32 + 0.5) * bin_width,
        (modes[1].0 as f32 + 0.5) * bin_width,
    ];
    angles.sort_by(f32::total_cmp);

    let delta = (angles[1] - angles[0]).min(angles[0] + PI - angles[1]);
    if delta <= min_angle {
        return None;
    }

    let v1 = Vector2::new(angles[0].cos(), angles[0].sin());
    let v2 = Vector2::new(angles[1].cos(), angles[1].sin());
    Some((v1, v2))
}

/// Modes of a circular histogram by mean-shift hill climbing.
///
/// The histogram is first smoothed with a Gaussian of `sigma` bins. Returns
/// `(bin, smoothed value)` pairs, strongest first. A flat histogram has no
/// modes.
pub fn find_histogram_modes(hist: &[f32], sigma: f32) -> Vec<(usize, f32)> {
    let n = hist.len();
    if n == 0 {
        return Vec::new();
    }

    let reach = (2.0 * sigma).round() as i64;
    let kernel: Vec<f32> = (-reach..=reach)
        .map(|j| {
            let j = j as f32;
            (-j * j / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let smoothed: Vec<f32> = (0..n as i64)
        .map(|i| {
            (-reach..=reach)
                .zip(&kernel)
                .map(|(j, k)| hist[(i + j).rem_euclid(n as i64) as usize] * k)
                .sum()
        })
        .collect();

    if smoothed.iter().all(|v| (v - smoothed[0]).abs() < 1e-5) {
        return Vec::new();
    }

    let mut modes: Vec<(usize, f32)> = Vec::new();
    for start in 0..n {
        let mut j = start;
        // A climb never needs more than one lap.
        for _ in 0..n {
            let h0 = smoothed[j];
            let next = (j + 1) % n;
            let prev = (j + n - 1) % n;
            let (h_next, h_prev) = (smoothed[next], smoothed[prev]);
            if h_next >= h0 && h_next >= h_prev {
                j = next;
            } else if h_prev > h0 && h_prev > h_next {
                j = prev;
            } else {
                break;
            }
        }
        if !modes.iter().any(|&(b, _)| b == j) {
            modes.push((j, smoothed[j]));
        }
    }

    modes.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    modes
}
