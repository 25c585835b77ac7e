use crate::error::EngineError;

/// Shape of a linguistic term's membership function.
///
/// Breakpoints must satisfy `a <= b <= c (<= d)`. Equal neighbouring
/// breakpoints collapse a ramp into an instantaneous step, so a trapezoid
/// like `(0, 0, 0.1, 0.3)` is already at full membership on its left edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MembershipFunction {
    /// Feet at `a` and `d`, plateau on `b..=c`.
    Trapezoid { a: f64, b: f64, c: f64, d: f64 },
    /// Feet at `a` and `c`, peak at `b`.
    Triangle { a: f64, b: f64, c: f64 },
}

impl MembershipFunction {
    pub fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self::Trapezoid { a, b, c, d }
    }

    pub fn triangle(a: f64, b: f64, c: f64) -> Self {
        Self::Triangle { a, b, c }
    }

    /// Degree of membership of `x`, in `[0, 1]`. Pure and total.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            Self::Trapezoid { a, b, c, d } => {
                // Plateau first so degenerate ramps (a == b, c == d) read
                // as steps instead of dividing by zero.
                if b <= x && x <= c {
                    1.0
                } else if x <= a || x >= d {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            }
            Self::Triangle { a, b, c } => {
                if x == b {
                    1.0
                } else if x <= a || x >= c {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            }
        }
    }

    pub(crate) fn validate(&self, variable: &str) -> Result<(), EngineError> {
        let ordered = match *self {
            Self::Trapezoid { a, b, c, d } => a <= b && b <= c && c <= d,
            Self::Triangle { a, b, c } => a <= b && b <= c,
        };
        let finite = match *self {
            Self::Trapezoid { a, b, c, d } => {
                a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite()
            }
            Self::Triangle { a, b, c } => a.is_finite() && b.is_finite() && c.is_finite(),
        };

        if ordered && finite {
            Ok(())
        } else {
            Err(EngineError::InvalidDomain {
                variable: variable.to_owned(),
                reason: format!("breakpoints out of order in {self:?}"),
            })
        }
    }

    /// Clamps every breakpoint onto `lower..=upper`. This is the policy for
    /// terms declared wider than their variable's universe.
    pub(crate) fn clamped_to(self, lower: f64, upper: f64) -> Self {
        let clamp = |v: f64| v.clamp(lower, upper);

        match self {
            Self::Trapezoid { a, b, c, d } => Self::Trapezoid {
                a: clamp(a),
                b: clamp(b),
                c: clamp(c),
                d: clamp(d),
            },
            Self::Triangle { a, b, c } => Self::Triangle {
                a: clamp(a),
                b: clamp(b),
                c: clamp(c),
            },
        }
    }
}

#[test]
fn trapezoid_degrees() {
    let mf = MembershipFunction::trapezoid(0.0, 0.0, 0.1, 0.3);

    assert_eq!(mf.degree(0.0), 1.0);
    assert_eq!(mf.degree(0.05), 1.0);
    assert!((mf.degree(0.2) - 0.5).abs() < 1e-12);
    assert_eq!(mf.degree(0.3), 0.0);
    assert_eq!(mf.degree(0.4), 0.0);
    assert_eq!(mf.degree(-1.0), 0.0);
}

#[test]
fn triangle_degrees() {
    let mf = MembershipFunction::triangle(0.1, 0.3, 0.5);

    assert_eq!(mf.degree(0.3), 1.0);
    assert!((mf.degree(0.2) - 0.5).abs() < 1e-12);
    assert!((mf.degree(0.4) - 0.5).abs() < 1e-12);
    assert_eq!(mf.degree(0.1), 0.0);
    assert_eq!(mf.degree(0.5), 0.0);
    assert_eq!(mf.degree(2.0), 0.0);
}

#[test]
fn degenerate_spans_are_steps() {
    let left = MembershipFunction::trapezoid(0.0, 0.0, 0.2, 0.4);
    assert_eq!(left.degree(0.0), 1.0);

    let right = MembershipFunction::trapezoid(0.6, 0.8, 1.0, 1.0);
    assert_eq!(right.degree(1.0), 1.0);
    assert_eq!(right.degree(1.1), 0.0);

    let spike = MembershipFunction::triangle(0.5, 0.5, 0.5);
    assert_eq!(spike.degree(0.5), 1.0);
    assert_eq!(spike.degree(0.4999), 0.0);
}

#[test]
fn degree_is_unimodal_and_bounded() {
    let mf = MembershipFunction::trapezoid(0.1, 0.3, 0.5, 0.9);
    let values: Vec<f64> = (0..=100).map(|i| mf.degree(i as f64 / 100.0)).collect();
    let peak = values
        .iter()
        .position(|&v| v == 1.0)
        .expect("plateau sampled");

    assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(values[..peak].windows(2).all(|w| w[0] <= w[1]));
    assert!(values[peak..].windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn rejects_unordered_breakpoints() {
    assert!(MembershipFunction::trapezoid(0.0, 0.5, 0.4, 1.0)
        .validate("m")
        .is_err());
    assert!(MembershipFunction::triangle(0.3, 0.2, 0.5)
        .validate("m")
        .is_err());
    assert!(MembershipFunction::triangle(0.0, f64::NAN, 0.5)
        .validate("m")
        .is_err());
    assert!(MembershipFunction::trapezoid(0.0, 0.0, 0.1, 0.3)
        .validate("m")
        .is_ok());
}
