use nalgebra::Vector2;
use std::f32::consts::PI;

/// Wrap an angle (radians) into `[-π, π)`.
pub fn wrap_angle(a: f32) -> f32 {
    let two_pi = 2.0 * PI;
    let mut r = (a + PI).rem_euclid(two_pi) - PI;
    if r >= PI {
        r -= two_pi;
    }
    r
}

/// Split `w` into its component along the unit vector `dir` and its
/// distance from the line spanned by `dir`.
#[inline]
pub fn along_and_across(w: Vector2<f32>, dir: Vector2<f32>) -> (f32, f32) {
    let along = w.dot(&dir);
    (along, (w - along * dir).norm())
}

/// `std / mean` of a set of lengths (population std). Infinite for a zero mean.
pub fn relative_spread(values: &[f32]) -> f32 {
    if values.is_empty() {
        return f32::INFINITY;
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    if mean <= f32::EPSILON {
        return f32::INFINITY;
    }
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    var.sqrt() / mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn angles_wrap_into_half_open_range() {
        assert_abs_diff_eq!(wrap_angle(0.25), 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(wrap_angle(2.0 * PI + 0.1), 0.1, epsilon = 1e-5);
        assert_abs_diff_eq!(wrap_angle(-PI - 0.1), PI - 0.1, epsilon = 1e-5);
        assert!(wrap_angle(PI) < PI);
    }

    #[test]
    fn decomposition_along_a_direction() {
        let (along, across) = along_and_across(Vector2::new(3.0, 4.0), Vector2::new(1.0, 0.0));
        assert_abs_diff_eq!(along, 3.0);
        assert_abs_diff_eq!(across, 4.0);
    }

    #[test]
    fn spread_of_equal_lengths_is_zero() {
        assert_abs_diff_eq!(relative_spread(&[5.0, 5.0]), 0.0);
        assert_abs_diff_eq!(relative_spread(&[4.0, 6.0]), 0.2, epsilon = 1e-6);
        assert!(relative_spread(&[]).is_infinite());
    }
}
