//! Synthetic checkerboard renderer with exact ground truth.
//!
//! Boards are described in "square" units: square `(i, j)` covers
//! `[i, i+1) x [j, j+1)` and inner corners sit at integer coordinates
//! `1..squares_x` by `1..squares_y`. A homography maps board units into
//! image pixels, so rotations and perspective come for free. Pixels are
//! area-sampled on a regular sub-grid, which gives anti-aliased edges whose
//! gradient-based corner estimate coincides with the true corner.

use crate::{homography_from_4pt, GrayImage, Homography};
use nalgebra::Point2;

#[derive(Clone, Debug)]
pub struct BoardRender {
    /// Number of squares along the board x axis (inner corners = `squares_x - 1`).
    pub squares_x: usize,
    /// Number of squares along the board y axis.
    pub squares_y: usize,
    /// Maps board units to image pixels.
    pub img_from_board: Homography,
    pub width: usize,
    pub height: usize,
    /// Sub-samples per pixel side.
    pub supersample: usize,
    pub dark: u8,
    pub light: u8,
}

impl BoardRender {
    /// Fronto-parallel board with `square_px` pixel squares whose top-left
    /// outer corner lands at `origin`.
    pub fn axis_aligned(
        squares_x: usize,
        squares_y: usize,
        square_px: f32,
        origin: Point2<f32>,
        width: usize,
        height: usize,
    ) -> Self {
        Self::with_homography(
            squares_x,
            squares_y,
            Homography::similarity(square_px as f64, 0.0, origin.x as f64, origin.y as f64),
            width,
            height,
        )
    }

    /// Board rotated by `angle_rad` about the image centre.
    pub fn rotated(
        squares_x: usize,
        squares_y: usize,
        square_px: f32,
        angle_rad: f32,
        width: usize,
        height: usize,
    ) -> Self {
        let (s, a) = (square_px as f64, angle_rad as f64);
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let (hx, hy) = (squares_x as f64 / 2.0, squares_y as f64 / 2.0);
        let (sn, cs) = a.sin_cos();
        // Place the board centre on the image centre.
        let tx = cx - s * (cs * hx - sn * hy);
        let ty = cy - s * (sn * hx + cs * hy);
        Self::with_homography(
            squares_x,
            squares_y,
            Homography::similarity(s, a, tx, ty),
            width,
            height,
        )
    }

    /// Board whose four outer corners map to `quad` (clockwise from the
    /// board origin). Returns `None` for a degenerate quad.
    pub fn perspective(
        squares_x: usize,
        squares_y: usize,
        quad: [Point2<f32>; 4],
        width: usize,
        height: usize,
    ) -> Option<Self> {
        let (sx, sy) = (squares_x as f32, squares_y as f32);
        let src = [
            Point2::new(0.0, 0.0),
            Point2::new(sx, 0.0),
            Point2::new(sx, sy),
            Point2::new(0.0, sy),
        ];
        let h = homography_from_4pt(&src, &quad)?;
        Some(Self::with_homography(squares_x, squares_y, h, width, height))
    }

    pub fn with_homography(
        squares_x: usize,
        squares_y: usize,
        img_from_board: Homography,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            squares_x,
            squares_y,
            img_from_board,
            width,
            height,
            supersample: 8,
            dark: 20,
            light: 230,
        }
    }

    /// Inner corner grid size as `(cols, rows)`.
    pub fn inner_corners_size(&self) -> (usize, usize) {
        (
            self.squares_x.saturating_sub(1),
            self.squares_y.saturating_sub(1),
        )
    }

    /// Ground-truth inner corners in image pixels, row-major (board y slower).
    pub fn inner_corners(&self) -> Vec<Point2<f32>> {
        let mut out = Vec::new();
        for j in 1..self.squares_y {
            for i in 1..self.squares_x {
                out.push(self.img_from_board.apply(Point2::new(i as f32, j as f32)));
            }
        }
        out
    }

    /// Render the board over a light background.
    pub fn render(&self) -> GrayImage {
        let mut img = GrayImage::new(self.width, self.height);
        let Some(board_from_img) = self.img_from_board.inverse() else {
            img.data.fill(self.light);
            return img;
        };

        let n = self.supersample.max(1);
        let step = 1.0 / n as f64;
        let total = (n * n) as f64;
        let (sx, sy) = (self.squares_x as f64, self.squares_y as f64);
        let dark = f64::from(self.dark);
        let light = f64::from(self.light);

        for y in 0..self.height {
            for x in 0..self.width {
                let mut dark_hits = 0usize;
                for ky in 0..n {
                    let py = y as f64 - 0.5 + (ky as f64 + 0.5) * step;
                    for kx in 0..n {
                        let px = x as f64 - 0.5 + (kx as f64 + 0.5) * step;
                        let (u, v) = board_from_img.apply_f64(px, py);
                        if u >= 0.0 && v >= 0.0 && u < sx && v < sy {
                            let parity = (u.floor() as i64 + v.floor() as i64).rem_euclid(2);
                            if parity == 0 {
                                dark_hits += 1;
                            }
                        }
                    }
                }
                let frac = dark_hits as f64 / total;
                let value = light + (dark - light) * frac;
                img.data[y * self.width + x] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
        img
    }
}

/// Uniform raster of the given size.
pub fn uniform(width: usize, height: usize, value: u8) -> GrayImage {
    GrayImage {
        width,
        height,
        data: vec![value; width * height],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_aligned_ground_truth_is_row_major() {
        let board = BoardRender::axis_aligned(4, 3, 10.0, Point2::new(5.0, 7.0), 60, 50);
        let corners = board.inner_corners();
        assert_eq!(board.inner_corners_size(), (3, 2));
        assert_eq!(corners.len(), 6);
        assert!((corners[0].x - 15.0).abs() < 1e-4 && (corners[0].y - 17.0).abs() < 1e-4);
        assert!((corners[1].x - 25.0).abs() < 1e-4 && (corners[1].y - 17.0).abs() < 1e-4);
        assert!((corners[3].x - 15.0).abs() < 1e-4 && (corners[3].y - 27.0).abs() < 1e-4);
    }

    #[test]
    fn render_paints_first_square_dark_and_background_light() {
        let board = BoardRender::axis_aligned(4, 3, 10.0, Point2::new(4.5, 4.5), 60, 50);
        let img = board.render();
        assert_eq!(img.data[10 * 60 + 10], board.dark);
        assert_eq!(img.data[10 * 60 + 20], board.light);
        assert_eq!(img.data[0], board.light);
    }
}
