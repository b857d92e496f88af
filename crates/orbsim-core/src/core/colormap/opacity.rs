use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OpacityCurveError {
    #[error("Power curve exponent must be positive and finite, got {0}")]
    InvalidGamma(f64),
    #[error("Logistic steepness must be positive and finite, got {0}")]
    InvalidSteepness(f64),
    #[error("Logistic midpoint must lie in [0, 1], got {0}")]
    InvalidMidpoint(f64),
    #[error("Opacity table needs at least 2 points")]
    TooFewPoints,
    #[error("Opacity table point {index} lies outside the unit square")]
    PointOutOfRange { index: usize },
    #[error("Opacity table is not monotone at point {index}")]
    NotMonotone { index: usize },
}

/// Monotone map from normalized magnitude in `[0, 1]` to opacity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum OpacityCurve {
    /// Opacity equals the normalized magnitude.
    #[default]
    Linear,
    /// `x^gamma`.
    Power { gamma: f64 },
    /// A logistic step rescaled so that 0 maps to 0 and 1 maps to 1.
    Logistic { midpoint: f64, steepness: f64 },
    /// Piecewise-linear interpolation through `(magnitude, opacity)` points.
    Table { points: Vec<(f64, f64)> },
}

impl OpacityCurve {
    /// Checks the curve parameters. Every curve that passes is monotone non-decreasing.
    pub fn validate(&self) -> Result<(), OpacityCurveError> {
        match self {
            OpacityCurve::Linear => Ok(()),
            OpacityCurve::Power { gamma } => {
                if gamma.is_finite() && *gamma > 0.0 {
                    Ok(())
                } else {
                    Err(OpacityCurveError::InvalidGamma(*gamma))
                }
            }
            OpacityCurve::Logistic {
                midpoint,
                steepness,
            } => {
                if !(steepness.is_finite() && *steepness > 0.0) {
                    Err(OpacityCurveError::InvalidSteepness(*steepness))
                } else if !(0.0..=1.0).contains(midpoint) {
                    Err(OpacityCurveError::InvalidMidpoint(*midpoint))
                } else {
                    Ok(())
                }
            }
            OpacityCurve::Table { points } => {
                if points.len() < 2 {
                    return Err(OpacityCurveError::TooFewPoints);
                }
                let unit = 0.0..=1.0;
                for (index, (x, y)) in points.iter().enumerate() {
                    if !unit.contains(x) || !unit.contains(y) {
                        return Err(OpacityCurveError::PointOutOfRange { index });
                    }
                }
                for (index, pair) in points.windows(2).enumerate() {
                    let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                    if x1 <= x0 || y1 < y0 {
                        return Err(OpacityCurveError::NotMonotone { index: index + 1 });
                    }
                }
                Ok(())
            }
        }
    }

    /// Opacity for a normalized magnitude. The input is clamped to `[0, 1]` and a zero
    /// magnitude always yields zero opacity.
    pub fn apply(&self, magnitude: f64) -> f64 {
        if magnitude.is_nan() || magnitude <= 0.0 {
            return 0.0;
        }
        let x = magnitude.min(1.0);
        let value = match self {
            OpacityCurve::Linear => x,
            OpacityCurve::Power { gamma } => x.powf(*gamma),
            OpacityCurve::Logistic {
                midpoint,
                steepness,
            } => {
                let sigmoid = |t: f64| 1.0 / (1.0 + (-steepness * (t - midpoint)).exp());
                let low = sigmoid(0.0);
                let high = sigmoid(1.0);
                if high - low <= f64::EPSILON {
                    x
                } else {
                    (sigmoid(x) - low) / (high - low)
                }
            }
            OpacityCurve::Table { points } => interpolate_table(points, x),
        };
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

fn interpolate_table(points: &[(f64, f64)], x: f64) -> f64 {
    let Some(&(first_x, first_y)) = points.first() else {
        return x;
    };
    if x <= first_x {
        return first_y;
    }
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x <= x1 {
            let t = if x1 > x0 { (x - x0) / (x1 - x0) } else { 1.0 };
            return y0 + (y1 - y0) * t;
        }
    }
    points.last().map_or(x, |&(_, y)| y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curves() -> Vec<OpacityCurve> {
        vec![
            OpacityCurve::Linear,
            OpacityCurve::Power { gamma: 0.5 },
            OpacityCurve::Power { gamma: 3.0 },
            OpacityCurve::Logistic {
                midpoint: 0.3,
                steepness: 12.0,
            },
            OpacityCurve::Table {
                points: vec![(0.0, 0.0), (0.2, 0.5), (0.6, 0.5), (1.0, 1.0)],
            },
        ]
    }

    #[test]
    fn every_curve_is_monotone_on_the_unit_interval() {
        for curve in curves() {
            curve.validate().unwrap();
            let mut last = 0.0;
            for i in 0..=1000 {
                let value = curve.apply(i as f64 / 1000.0);
                assert!(value >= last - 1e-12, "{curve:?} decreased at {i}");
                assert!((0.0..=1.0).contains(&value));
                last = value;
            }
        }
    }

    #[test]
    fn zero_magnitude_is_always_transparent() {
        for curve in curves() {
            assert_eq!(curve.apply(0.0), 0.0);
            assert_eq!(curve.apply(-1.0), 0.0);
            assert_eq!(curve.apply(f64::NAN), 0.0);
        }
        let raised = OpacityCurve::Table {
            points: vec![(0.0, 0.2), (1.0, 1.0)],
        };
        assert_eq!(raised.apply(0.0), 0.0);
    }

    #[test]
    fn logistic_is_pinned_at_both_ends() {
        let curve = OpacityCurve::Logistic {
            midpoint: 0.5,
            steepness: 8.0,
        };
        assert!(curve.apply(1e-15) < 1e-9);
        assert!((curve.apply(1.0) - 1.0).abs() < 1e-12);
        assert!((curve.apply(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn magnitudes_above_one_saturate() {
        assert_eq!(OpacityCurve::Linear.apply(3.0), 1.0);
        assert_eq!(OpacityCurve::Power { gamma: 2.0 }.apply(2.0), 1.0);
    }

    #[test]
    fn table_interpolates_linearly() {
        let curve = OpacityCurve::Table {
            points: vec![(0.0, 0.0), (0.5, 0.2), (1.0, 1.0)],
        };
        assert!((curve.apply(0.25) - 0.1).abs() < 1e-12);
        assert!((curve.apply(0.75) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn invalid_curves_are_rejected() {
        assert_eq!(
            OpacityCurve::Power { gamma: 0.0 }.validate(),
            Err(OpacityCurveError::InvalidGamma(0.0))
        );
        assert!(matches!(
            OpacityCurve::Logistic {
                midpoint: 0.5,
                steepness: -1.0
            }
            .validate(),
            Err(OpacityCurveError::InvalidSteepness(_))
        ));
        assert!(matches!(
            OpacityCurve::Logistic {
                midpoint: 1.5,
                steepness: 1.0
            }
            .validate(),
            Err(OpacityCurveError::InvalidMidpoint(_))
        ));
        assert_eq!(
            OpacityCurve::Table {
                points: vec![(0.0, 0.0)]
            }
            .validate(),
            Err(OpacityCurveError::TooFewPoints)
        );
        assert_eq!(
            OpacityCurve::Table {
                points: vec![(0.0, 0.5), (0.5, 0.4), (1.0, 1.0)]
            }
            .validate(),
            Err(OpacityCurveError::NotMonotone { index: 1 })
        );
        assert_eq!(
            OpacityCurve::Table {
                points: vec![(0.0, 0.0), (1.2, 1.0)]
            }
            .validate(),
            Err(OpacityCurveError::PointOutOfRange { index: 1 })
        );
    }

    #[test]
    fn curve_deserializes_from_tagged_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            curve: OpacityCurve,
        }
        let parsed: Wrapper = toml::from_str(
            r#"
            [curve]
            kind = "logistic"
            midpoint = 0.4
            steepness = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.curve,
            OpacityCurve::Logistic {
                midpoint: 0.4,
                steepness: 10.0
            }
        );
    }
}
