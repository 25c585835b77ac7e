use std::ops::RangeInclusive;

use crate::error::EngineError;

/// Discretized domain of a linguistic variable.
///
/// The grid is computed once at construction and shared by every term of
/// the variable, so all sampled curves line up point for point. Points are
/// placed linspace-style: the first is exactly the lower bound and the last
/// exactly the upper bound.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    points: Vec<f64>,
    lower: f64,
    upper: f64,
}

impl Universe {
    pub(crate) fn new(
        variable: &str,
        range: RangeInclusive<f64>,
        step: f64,
    ) -> Result<Self, EngineError> {
        let (lower, upper) = (*range.start(), *range.end());

        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(EngineError::InvalidDomain {
                variable: variable.to_owned(),
                reason: format!("empty universe {lower}..={upper}"),
            });
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(EngineError::InvalidDomain {
                variable: variable.to_owned(),
                reason: format!("step {step} is not a positive number"),
            });
        }

        // Round so a step that divides the span exactly is not lost to
        // representation error (1.2 / 0.001 lands just below 1200); the
        // extra point makes the upper bound inclusive.
        let num = ((upper - lower) / step).round() as usize + 1;
        let points = if num > 1 {
            let span = (upper - lower) / (num - 1) as f64;
            let mut points: Vec<f64> = (0..num).map(|i| lower + span * i as f64).collect();
            // Pin the endpoint; the multiplication above can land a hair off.
            points[num - 1] = upper;
            points
        } else {
            vec![lower]
        };

        Ok(Self {
            points,
            lower,
            upper,
        })
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }
}

#[test]
fn grid_is_inclusive_and_increasing() {
    let u = Universe::new("m", 0.0..=1.2, 0.001).unwrap();

    assert_eq!(u.len(), 1201);
    assert_eq!(u.points()[0], 0.0);
    assert_eq!(*u.points().last().unwrap(), 1.2);
    assert!(u.points().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn oversized_step_degrades_to_a_single_point() {
    let u = Universe::new("m", 0.0..=1.0, 5.0).unwrap();

    assert_eq!(u.points(), &[0.0]);
}

#[test]
fn rejects_empty_range_and_bad_step() {
    assert!(matches!(
        Universe::new("m", 1.0..=1.0, 0.1),
        Err(EngineError::InvalidDomain { .. })
    ));
    assert!(matches!(
        Universe::new("m", 0.0..=1.0, 0.0),
        Err(EngineError::InvalidDomain { .. })
    ));
    assert!(matches!(
        Universe::new("m", 0.0..=1.0, -0.1),
        Err(EngineError::InvalidDomain { .. })
    ));
}
