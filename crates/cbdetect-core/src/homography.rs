use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Planar projective map `p' ~ H p`.
///
/// Used to place synthetic boards in an image and to describe the expected
/// perspective of a board plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    /// Similarity transform: scale, rotate by `angle_rad`, then translate.
    pub fn similarity(scale: f64, angle_rad: f64, tx: f64, ty: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        Self::new(Matrix3::new(
            scale * c,
            -scale * s,
            tx,
            scale * s,
            scale * c,
            ty,
            0.0,
            0.0,
            1.0,
        ))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    /// Same as [`Homography::apply`] without the round trip through `f32`.
    #[inline]
    pub fn apply_f64(&self, x: f64, y: f64) -> (f64, f64) {
        let v = self.h * Vector3::new(x, y, 1.0);
        (v[0] / v[2], v[1] / v[2])
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Homography with `dst ~ H src` from four correspondences (`h33 = 1`).
///
/// Returns `None` for degenerate configurations (three collinear points).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (k, (s, d)) in src.iter().zip(dst).enumerate() {
        let (x, y) = (s.x as f64, s.y as f64);
        let (u, v) = (d.x as f64, d.y as f64);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = r0 + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }

    Some(Homography::new(Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    )))
}
