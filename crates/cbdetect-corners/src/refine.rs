//! Structure-tensor refinement of edge directions and corner position.

use crate::gradient::GradientField;
use nalgebra::{Matrix2, Point2, Vector2};

/// Gradients weaker than this carry no edge evidence.
const MIN_GRADIENT: f32 = 0.1;

/// A unit gradient counts as belonging to an edge along `v` when
/// `|ĝ · v|` stays below this.
const EDGE_ALIGNMENT: f32 = 0.25;

/// Pixels farther than this from both edge lines are ignored by the
/// position fit.
const LINE_DISTANCE: f32 = 3.0;

/// Clipped inclusive window `[x0, x1] x [y0, y1]` around a pixel.
fn window(grad: &GradientField, cx: usize, cy: usize, radius: usize) -> (usize, usize, usize, usize) {
    (
        cx.saturating_sub(radius),
        cy.saturating_sub(radius),
        (cx + radius).min(grad.width() - 1),
        (cy + radius).min(grad.height() - 1),
    )
}

/// Refine both edge directions around pixel `(cx, cy)`.
///
/// For each direction the gradients that are nearly orthogonal to it are
/// accumulated into a structure tensor; the refined direction is the
/// eigenvector of its smallest eigenvalue. A direction without supporting
/// gradients is kept as is.
pub fn refine_directions(
    grad: &GradientField,
    cx: usize,
    cy: usize,
    radius: usize,
    v1: Vector2<f32>,
    v2: Vector2<f32>,
) -> (Vector2<f32>, Vector2<f32>) {
    let (x0, y0, x1, y1) = window(grad, cx, cy, radius);
    let mut a1 = Matrix2::<f64>::zeros();
    let mut a2 = Matrix2::<f64>::zeros();

    for y in y0..=y1 {
        for x in x0..=x1 {
            let g = Vector2::new(grad.du.at(x, y), grad.dv.at(x, y));
            let norm = g.norm();
            if norm < MIN_GRADIENT {
                continue;
            }
            let unit = g / norm;
            let gg = g.cast::<f64>() * g.cast::<f64>().transpose();
            if unit.dot(&v1).abs() < EDGE_ALIGNMENT {
                a1 += gg;
            }
            if unit.dot(&v2).abs() < EDGE_ALIGNMENT {
                a2 += gg;
            }
        }
    }

    (min_eigenvector(&a1).unwrap_or(v1), min_eigenvector(&a2).unwrap_or(v2))
}

fn min_eigenvector(a: &Matrix2<f64>) -> Option<Vector2<f32>> {
    if a.trace() <= f64::EPSILON {
        return None;
    }
    let eig = a.symmetric_eigen();
    let k = if eig.eigenvalues[0] <= eig.eigenvalues[1] { 0 } else { 1 };
    let v = eig.eigenvectors.column(k);
    let v = Vector2::new(v[0] as f32, v[1] as f32);
    let n = v.norm();
    (n > 0.0).then(|| v / n)
}

/// Sub-pixel corner position as the least-squares intersection of the two
/// edge lines through `(cx, cy)`.
///
/// Every edge pixel `q` near either line with gradient `g` contributes the
/// constraint `gᵀ (p − q) = 0`, giving `p = (Σ g gᵀ)⁻¹ Σ g gᵀ q`. Returns
/// `None` for a singular system or when the solution moves `max_shift`
/// pixels or more away from the start.
pub fn refine_position(
    grad: &GradientField,
    cx: usize,
    cy: usize,
    radius: usize,
    v1: Vector2<f32>,
    v2: Vector2<f32>,
    max_shift: f32,
) -> Option<Point2<f32>> {
    let (x0, y0, x1, y1) = window(grad, cx, cy, radius);
    let mut g_sum = Matrix2::<f64>::zeros();
    let mut b = Vector2::<f64>::zeros();

    for y in y0..=y1 {
        for x in x0..=x1 {
            if x == cx && y == cy {
                continue;
            }
            let g = Vector2::new(grad.du.at(x, y), grad.dv.at(x, y));
            let norm = g.norm();
            if norm < MIN_GRADIENT {
                continue;
            }
            let unit = g / norm;

            // offset from the integer centre
            let w = Vector2::new(x as f32 - cx as f32, y as f32 - cy as f32);
            let d1 = (w - w.dot(&v1) * v1).norm();
            let d2 = (w - w.dot(&v2) * v2).norm();
            let on_edge1 = d1 < LINE_DISTANCE && unit.dot(&v1).abs() < EDGE_ALIGNMENT;
            let on_edge2 = d2 < LINE_DISTANCE && unit.dot(&v2).abs() < EDGE_ALIGNMENT;
            if !(on_edge1 || on_edge2) {
                continue;
            }

            let g = g.cast::<f64>();
            let gg = g * g.transpose();
            g_sum += gg;
            b += gg * w.cast::<f64>();
        }
    }

    let scale = g_sum.trace();
    if scale <= f64::EPSILON || g_sum.determinant().abs() <= 1e-6 * scale * scale {
        return None;
    }
    let shift = g_sum.try_inverse()? * b;
    if !shift.iter().all(|v| v.is_finite()) || shift.norm() >= f64::from(max_shift) {
        return None;
    }

    Some(Point2::new(
        cx as f32 + shift.x as f32,
        cy as f32 + shift.y as f32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbdetect_core::synthetic::BoardRender;
    use cbdetect_core::ImageF32;

    fn board_gradient() -> (GradientField, BoardRender) {
        let board = BoardRender::rotated(6, 6, 22.0, 0.3, 180, 180);
        let raster = board.render();
        let img = ImageF32::from_gray_normalized(&raster.view()).expect("contrast");
        (GradientField::prewitt(&img), board)
    }

    #[test]
    fn directions_snap_to_rotated_edges() {
        let (grad, board) = board_gradient();
        let gt = board.inner_corners()[14];
        let (cx, cy) = (gt.x.round() as usize, gt.y.round() as usize);

        let rough1 = Vector2::new(1.0, 0.2).normalize();
        let rough2 = Vector2::new(-0.2, 1.0).normalize();
        let (v1, v2) = refine_directions(&grad, cx, cy, 10, rough1, rough2);

        let e1 = Vector2::new(0.3f32.cos(), 0.3f32.sin());
        let e2 = Vector2::new(-(0.3f32.sin()), 0.3f32.cos());
        assert!(v1.dot(&e1).abs() > 0.995, "v1 = {v1:?}");
        assert!(v2.dot(&e2).abs() > 0.995, "v2 = {v2:?}");
    }

    #[test]
    fn position_converges_to_ground_truth() {
        let (grad, board) = board_gradient();
        let v1 = Vector2::new(0.3f32.cos(), 0.3f32.sin());
        let v2 = Vector2::new(-(0.3f32.sin()), 0.3f32.cos());
        for gt in board.inner_corners() {
            let (cx, cy) = (gt.x.round() as usize, gt.y.round() as usize);
            let p = refine_position(&grad, cx, cy, 10, v1, v2, 4.0).expect("well-posed");
            assert!((p - gt).norm() < 0.3, "refined {p:?}, truth {gt:?}");
        }
    }

    #[test]
    fn flat_patch_is_singular() {
        let grad = GradientField::prewitt(&ImageF32::new(30, 30));
        let v1 = Vector2::new(1.0, 0.0);
        let v2 = Vector2::new(0.0, 1.0);
        assert!(refine_position(&grad, 15, 15, 10, v1, v2, 4.0).is_none());
        let (r1, r2) = refine_directions(&grad, 15, 15, 10, v1, v2);
        assert_eq!((r1, r2), (v1, v2));
    }
}
