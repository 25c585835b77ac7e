use std::iter::Sum;

use num::Float;

/// Discrete centroid of a sampled curve: `sum(x * y) / sum(y)`.
///
/// `None` when the curve carries no area; the caller reports that instead
/// of inventing a value.
pub(crate) fn centroid<F: Float + Sum>(xs: &[F], ys: &[F]) -> Option<F> {
    let den: F = ys.iter().copied().sum();

    if den == F::zero() {
        return None;
    }

    let num: F = xs
        .iter()
        .copied()
        .zip(ys.iter().copied())
        .map(|(x, y)| x * y)
        .sum();

    Some(num / den)
}

#[test]
fn centroid_of_symmetric_triangle_is_its_peak() {
    let xs: Vec<f64> = (0..=400).map(|i| i as f64 * 0.001).collect();
    let tri = crate::membership::MembershipFunction::triangle(0.0, 0.2, 0.4);
    let ys: Vec<f64> = xs.iter().map(|&x| tri.degree(x)).collect();

    let c = centroid(&xs, &ys).unwrap();
    assert!((c - 0.2).abs() < 1e-9);

    // Min-capping a symmetric triangle keeps it symmetric.
    let capped: Vec<f64> = ys.iter().map(|&y| y.min(0.5)).collect();
    let c = centroid(&xs, &capped).unwrap();
    assert!((c - 0.2).abs() < 1e-9);
}

#[test]
fn centroid_of_zero_curve_is_undefined() {
    let xs = [0.0, 0.5, 1.0];
    let ys = [0.0, 0.0, 0.0];

    assert_eq!(centroid(&xs, &ys), None);
}
