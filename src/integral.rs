use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array1};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::QuadratureError;
use crate::integrand::Integrand;
use crate::partition::{Interval, Partition};

pub trait Integral {
    fn integrate<I, R>(
        &self,
        f: &I,
        partition: &Partition,
        rng: &mut R,
    ) -> Result<f64, QuadratureError>
    where
        I: Integrand + ?Sized,
        R: Rng + ?Sized;

    /// Builds the partition for `(interval, n)` and integrates over it.
    fn compute<I, R>(
        &self,
        f: &I,
        interval: Interval,
        n: usize,
        rng: &mut R,
    ) -> Result<f64, QuadratureError>
    where
        I: Integrand + ?Sized,
        R: Rng + ?Sized,
    {
        let partition = Partition::new(interval, n)?;

        self.integrate(f, &partition, rng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuadratureRule {
    Left,
    Right,
    Mid,
    Random,
    Trapezoid,
    Simpson,
}

impl QuadratureRule {
    pub const ALL: [QuadratureRule; 6] = [
        QuadratureRule::Left,
        QuadratureRule::Right,
        QuadratureRule::Mid,
        QuadratureRule::Random,
        QuadratureRule::Trapezoid,
        QuadratureRule::Simpson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QuadratureRule::Left => "left",
            QuadratureRule::Right => "right",
            QuadratureRule::Mid => "mid",
            QuadratureRule::Random => "random",
            QuadratureRule::Trapezoid => "trapezoid",
            QuadratureRule::Simpson => "simpson",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuadratureRule::Left => "Rectangles (left)",
            QuadratureRule::Right => "Rectangles (right)",
            QuadratureRule::Mid => "Rectangles (midpoint)",
            QuadratureRule::Random => "Rectangles (random)",
            QuadratureRule::Trapezoid => "Trapezoid",
            QuadratureRule::Simpson => "Simpson",
        }
    }

    pub fn is_deterministic(self) -> bool {
        self != QuadratureRule::Random
    }
}

impl fmt::Display for QuadratureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown quadrature rule '{0}'")]
pub struct UnknownRuleError(pub String);

impl FromStr for QuadratureRule {
    type Err = UnknownRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuadratureRule::ALL
            .into_iter()
            .find(|rule| rule.name() == s)
            .ok_or_else(|| UnknownRuleError(s.to_owned()))
    }
}

impl Integral for QuadratureRule {
    fn integrate<I, R>(
        &self,
        f: &I,
        partition: &Partition,
        rng: &mut R,
    ) -> Result<f64, QuadratureError>
    where
        I: Integrand + ?Sized,
        R: Rng + ?Sized,
    {
        let dx = partition.dx();

        let value = match self {
            QuadratureRule::Left => f.evaluate_all(partition.left_endpoints()).sum() * dx,
            QuadratureRule::Right => f.evaluate_all(partition.right_endpoints()).sum() * dx,
            QuadratureRule::Mid => f.evaluate_all(partition.midpoints().view()).sum() * dx,
            QuadratureRule::Random => {
                let samples: Array1<f64> = partition
                    .left_endpoints()
                    .iter()
                    .map(|&lo| lo + rng.gen::<f64>() * dx)
                    .collect();

                f.evaluate_all(samples.view()).sum() * dx
            }
            QuadratureRule::Trapezoid => {
                let y = f.evaluate_all(partition.nodes());

                (&y.slice(s![..-1]) + &y.slice(s![1..])).sum() * dx / 2.
            }
            QuadratureRule::Simpson => {
                let y = f.evaluate_all(partition.nodes());
                let y_mid = f.evaluate_all(partition.midpoints().view());

                (&y.slice(s![..-1]) + &(y_mid * 4.) + &y.slice(s![1..])).sum() * dx / 6.
            }
        };

        debug!(rule = %self, n = partition.n(), value, "evaluated quadrature rule");

        if !value.is_finite() {
            return Err(QuadratureError::NumericAnomaly {
                rule: *self,
                n: partition.n(),
                value,
            });
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::integrand::CosSquared;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn zero_to_pi() -> Interval {
        Interval::new(0., PI).unwrap()
    }

    #[test]
    fn test_single_subinterval() {
        let mut rng = StdRng::seed_from_u64(0);
        let f = CosSquared;
        let compute = |rule: QuadratureRule, rng: &mut StdRng| {
            rule.compute(&f, zero_to_pi(), 1, rng).unwrap()
        };

        assert_relative_eq!(compute(QuadratureRule::Left, &mut rng), PI);
        assert_relative_eq!(compute(QuadratureRule::Right, &mut rng), PI);
        assert_abs_diff_eq!(compute(QuadratureRule::Mid, &mut rng), 0., epsilon = 1e-15);
        assert_relative_eq!(compute(QuadratureRule::Trapezoid, &mut rng), PI);
        assert_relative_eq!(
            compute(QuadratureRule::Simpson, &mut rng),
            PI / 3.,
            epsilon = 1e-15
        );

        let random = compute(QuadratureRule::Random, &mut rng);
        assert!((0. ..=PI).contains(&random));
    }

    #[test]
    fn test_simpson_matches_per_subinterval_formula() {
        let f = CosSquared;
        let mut rng = StdRng::seed_from_u64(0);
        let n = 3;
        let partition = Partition::new(Interval::new(0.1, 1.3).unwrap(), n).unwrap();
        let dx = partition.dx();

        let expected: f64 = (0..n)
            .map(|i| {
                let left = 0.1 + i as f64 * dx;
                let right = 0.1 + (i + 1) as f64 * dx;
                let mid = 0.1 + (i as f64 + 0.5) * dx;

                dx / 6. * (f.evaluate(left) + 4. * f.evaluate(mid) + f.evaluate(right))
            })
            .sum();

        let simpson = QuadratureRule::Simpson
            .integrate(&f, &partition, &mut rng)
            .unwrap();

        assert_relative_eq!(simpson, expected, epsilon = 1e-14);
    }

    #[test]
    fn test_trapezoid_is_mean_of_left_and_right() {
        let f = CosSquared;
        let mut rng = StdRng::seed_from_u64(0);
        let partition = Partition::new(Interval::new(0.2, 2.9).unwrap(), 7).unwrap();

        let left = QuadratureRule::Left.integrate(&f, &partition, &mut rng).unwrap();
        let right = QuadratureRule::Right.integrate(&f, &partition, &mut rng).unwrap();
        let trapezoid = QuadratureRule::Trapezoid
            .integrate(&f, &partition, &mut rng)
            .unwrap();

        assert_relative_eq!(trapezoid, (left + right) / 2., epsilon = 1e-14);
    }

    #[test]
    fn test_large_n_accuracy() {
        let f = CosSquared;
        let mut rng = StdRng::seed_from_u64(0);
        let partition = Partition::new(zero_to_pi(), 1024).unwrap();

        let simpson = QuadratureRule::Simpson
            .integrate(&f, &partition, &mut rng)
            .unwrap();
        let trapezoid = QuadratureRule::Trapezoid
            .integrate(&f, &partition, &mut rng)
            .unwrap();

        assert!((simpson - FRAC_PI_2).abs() < 1e-12);
        assert!((trapezoid - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_non_periodic_convergence() {
        // Over a non-period interval the Riemann sums no longer benefit from periodicity.
        let f = CosSquared;
        let interval = Interval::new(0., 1.).unwrap();
        let exact = f.exact_integral(interval);
        let mut rng = StdRng::seed_from_u64(0);

        let error = |rule: QuadratureRule, n: usize, rng: &mut StdRng| {
            (rule.compute(&f, interval, n, rng).unwrap() - exact).abs()
        };

        for rule in [QuadratureRule::Left, QuadratureRule::Right] {
            let ratio = error(rule, 64, &mut rng) / error(rule, 128, &mut rng);
            assert_relative_eq!(ratio, 2., epsilon = 0.05);
        }

        for rule in [QuadratureRule::Mid, QuadratureRule::Trapezoid] {
            let ratio = error(rule, 16, &mut rng) / error(rule, 32, &mut rng);
            assert_relative_eq!(ratio, 4., epsilon = 0.05);
        }

        let ratio =
            error(QuadratureRule::Simpson, 8, &mut rng) / error(QuadratureRule::Simpson, 16, &mut rng);
        assert_relative_eq!(ratio, 16., epsilon = 0.5);
    }

    #[test]
    fn test_deterministic_rules_are_reproducible() {
        let f = CosSquared;
        let mut rng = StdRng::seed_from_u64(1);

        for rule in QuadratureRule::ALL.into_iter().filter(|r| r.is_deterministic()) {
            for n in [1, 5, 64] {
                let first = rule.compute(&f, zero_to_pi(), n, &mut rng).unwrap();
                let second = rule.compute(&f, zero_to_pi(), n, &mut rng).unwrap();

                assert_eq!(first.to_bits(), second.to_bits());
            }
        }
    }

    #[test]
    fn test_random_varies_between_calls() {
        let f = CosSquared;
        let mut rng = StdRng::seed_from_u64(7);

        let values: Vec<f64> = (0..200)
            .map(|_| {
                QuadratureRule::Random
                    .compute(&f, zero_to_pi(), 8, &mut rng)
                    .unwrap()
            })
            .collect();

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

        assert!(variance > 0.);
        assert_relative_eq!(mean, FRAC_PI_2, epsilon = 0.05);
        assert!(values.iter().all(|v| (v - FRAC_PI_2).abs() < 1.));
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let f = CosSquared;

        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            QuadratureRule::Random
                .compute(&f, zero_to_pi(), 16, &mut rng)
                .unwrap()
        };

        assert_eq!(run(42).to_bits(), run(42).to_bits());
    }

    #[test]
    fn test_random_samples_stay_inside_subintervals() {
        let mut rng = StdRng::seed_from_u64(3);
        let partition = Partition::new(zero_to_pi(), 4).unwrap();

        // The indicator of [0, π/4) picks out the first subinterval only.
        let first_quarter = |x: f64| if x < PI / 4. { 1. } else { 0. };
        struct Indicator<F>(F);
        impl<F: Fn(f64) -> f64> Integrand for Indicator<F> {
            fn evaluate(&self, x: f64) -> f64 {
                (self.0)(x)
            }
            fn exact_integral(&self, _interval: Interval) -> f64 {
                PI / 4.
            }
            fn describe(&self) -> &'static str {
                "indicator"
            }
        }

        for _ in 0..50 {
            let value = QuadratureRule::Random
                .integrate(&Indicator(first_quarter), &partition, &mut rng)
                .unwrap();
            assert_relative_eq!(value, PI / 4.);
        }
    }

    #[test]
    fn test_zero_subdivisions_fail_for_every_rule() {
        let mut rng = StdRng::seed_from_u64(0);

        for rule in QuadratureRule::ALL {
            assert_eq!(
                rule.compute(&CosSquared, zero_to_pi(), 0, &mut rng),
                Err(QuadratureError::ZeroSubdivisions)
            );
        }
    }

    #[test]
    fn test_non_finite_result() {
        struct Pole;
        impl Integrand for Pole {
            fn evaluate(&self, x: f64) -> f64 {
                1. / x
            }
            fn exact_integral(&self, _interval: Interval) -> f64 {
                f64::INFINITY
            }
            fn describe(&self) -> &'static str {
                "1/x"
            }
        }

        let mut rng = StdRng::seed_from_u64(0);
        let err = QuadratureRule::Left
            .compute(&Pole, Interval::new(0., 1.).unwrap(), 4, &mut rng)
            .unwrap_err();

        assert!(matches!(
            err,
            QuadratureError::NumericAnomaly {
                rule: QuadratureRule::Left,
                n: 4,
                ..
            }
        ));
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_rule_names() {
        for rule in QuadratureRule::ALL {
            assert_eq!(rule.name().parse::<QuadratureRule>(), Ok(rule));
        }

        assert_eq!(
            "gauss".parse::<QuadratureRule>(),
            Err(UnknownRuleError("gauss".to_owned()))
        );
        assert_eq!(QuadratureRule::Trapezoid.to_string(), "trapezoid");
    }
}
