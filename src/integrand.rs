use ndarray::{Array1, ArrayView1};

use crate::partition::Interval;

pub trait Integrand {
    fn evaluate(&self, x: f64) -> f64;

    /// Element-wise evaluation; the result has the same length and order as `xs`.
    fn evaluate_all(&self, xs: ArrayView1<'_, f64>) -> Array1<f64> {
        xs.mapv(|x| self.evaluate(x))
    }

    /// Closed-form value of the definite integral over `interval`.
    fn exact_integral(&self, interval: Interval) -> f64;

    fn describe(&self) -> &'static str;
}

/// f(x) = cos²(x)
#[derive(Debug, Clone, Copy, Default)]
pub struct CosSquared;

impl CosSquared {
    fn antiderivative(x: f64) -> f64 {
        x / 2. + (2. * x).sin() / 4.
    }
}

impl Integrand for CosSquared {
    fn evaluate(&self, x: f64) -> f64 {
        x.cos().powi(2)
    }

    fn exact_integral(&self, interval: Interval) -> f64 {
        let (a, b) = interval.bounds();

        Self::antiderivative(b) - Self::antiderivative(a)
    }

    fn describe(&self) -> &'static str {
        "f(x) = cos²(x)"
    }
}
