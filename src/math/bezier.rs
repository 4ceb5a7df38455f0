//! Bezier segment evaluation using the Bernstein basis

use glam::Vec3;

/// Evaluate a Bezier segment of arbitrary degree at parameter `t`.
///
/// Dispatches to the closed forms for linear and cubic segments, which are
/// the only degrees the curve editor produces; other sizes fall back to the
/// generic Bernstein sum.
pub fn bezier(t: f32, points: &[Vec3]) -> Vec3 {
    match points.len() {
        2 => linear(t, points[0], points[1]),
        4 => cubic(t, points[0], points[1], points[2], points[3]),
        _ => bernstein(t, points),
    }
}

/// Linear interpolation between two points.
pub fn linear(t: f32, a: Vec3, b: Vec3) -> Vec3 {
    (1.0 - t) * a + t * b
}

/// Quadratic Bezier segment.
pub fn quadratic(t: f32, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let s = 1.0 - t;
    (s * s) * a + (2.0 * t * s) * b + (t * t) * c
}

/// Cubic Bezier segment.
pub fn cubic(t: f32, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Vec3 {
    let s = 1.0 - t;
    (s * s * s) * a + (3.0 * t * s * s) * b + (3.0 * t * t * s) * c + (t * t * t) * d
}

fn factorial(n: usize) -> f32 {
    (1..=n).fold(1.0, |r, i| r * i as f32)
}

fn bernstein_term(t: f32, i: usize, n: usize) -> f32 {
    let coefficient = factorial(n) / (factorial(i) * factorial(n - i));
    coefficient * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)
}

fn bernstein(t: f32, points: &[Vec3]) -> Vec3 {
    let n = points.len() - 1;
    points
        .iter()
        .enumerate()
        .fold(Vec3::ZERO, |b, (i, p)| b + bernstein_term(t, i, n) * *p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, 4.0, 0.0);
        assert_eq!(linear(0.0, a, b), a);
        assert_eq!(linear(1.0, a, b), b);
        assert_eq!(linear(0.5, a, b), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_cubic_endpoints() {
        let p = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ];
        assert!((cubic(0.0, p[0], p[1], p[2], p[3]) - p[0]).length() < 1e-6);
        assert!((cubic(1.0, p[0], p[1], p[2], p[3]) - p[3]).length() < 1e-6);
    }

    #[test]
    fn test_cubic_matches_bernstein() {
        let p = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.5, 2.0, 0.0),
            Vec3::new(1.5, 2.0, 1.0),
            Vec3::new(2.0, 0.0, 1.0),
        ];
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let fast = cubic(t, p[0], p[1], p[2], p[3]);
            let slow = bernstein(t, &p);
            assert!((fast - slow).length() < 1e-4);
        }
    }

    #[test]
    fn test_quadratic_midpoint() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 2.0, 0.0);
        let c = Vec3::new(2.0, 0.0, 0.0);
        let mid = quadratic(0.5, a, b, c);
        assert!((mid - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_dispatch_by_size() {
        let p2 = [Vec3::ZERO, Vec3::ONE];
        assert!((bezier(0.5, &p2) - Vec3::splat(0.5)).length() < 1e-6);

        let p3 = [Vec3::ZERO, Vec3::new(1.0, 2.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        assert!((bezier(0.5, &p3) - quadratic(0.5, p3[0], p3[1], p3[2])).length() < 1e-6);
    }
}
