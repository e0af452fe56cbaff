use ndarray::{s, Array1, ArrayView1};
use serde::Deserialize;
use std::f64::consts::PI;

use crate::error::QuadratureError;
use crate::integrand::Integrand;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "(f64, f64)")]
pub struct Interval {
    a: f64,
    b: f64,
}

impl Interval {
    pub const ZERO_TO_PI: Interval = Interval { a: 0., b: PI };

    pub fn new(a: f64, b: f64) -> Result<Self, QuadratureError> {
        if !(a.is_finite() && b.is_finite() && a < b) {
            return Err(QuadratureError::InvalidInterval { a, b });
        }

        Ok(Self { a, b })
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.a, self.b)
    }

    pub fn width(&self) -> f64 {
        self.b - self.a
    }
}

impl TryFrom<(f64, f64)> for Interval {
    type Error = QuadratureError;

    fn try_from((a, b): (f64, f64)) -> Result<Self, Self::Error> {
        Interval::new(a, b)
    }
}

/// Uniform partition of an interval into `n` subintervals of width `dx`.
///
/// Every rule reads its sample points from here, so all rules see the same
/// nodes `a + i·dx` for a given `(interval, n)`.
#[derive(Debug, Clone)]
pub struct Partition {
    interval: Interval,
    n: usize,
    dx: f64,
    nodes: Array1<f64>,
}

impl Partition {
    pub fn new(interval: Interval, n: usize) -> Result<Self, QuadratureError> {
        if n == 0 {
            return Err(QuadratureError::ZeroSubdivisions);
        }

        let (a, _) = interval.bounds();
        let dx = interval.width() / n as f64;
        let nodes = Array1::from_shape_fn(n + 1, |i| a + i as f64 * dx);

        Ok(Self {
            interval,
            n,
            dx,
            nodes,
        })
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// All `n + 1` partition points.
    pub fn nodes(&self) -> ArrayView1<'_, f64> {
        self.nodes.view()
    }

    pub fn left_endpoints(&self) -> ArrayView1<'_, f64> {
        self.nodes.slice(s![..-1])
    }

    pub fn right_endpoints(&self) -> ArrayView1<'_, f64> {
        self.nodes.slice(s![1..])
    }

    pub fn midpoints(&self) -> Array1<f64> {
        let (a, _) = self.interval.bounds();

        Array1::from_shape_fn(self.n, |i| a + (i as f64 + 0.5) * self.dx)
    }

    /// Midpoint rectangles, one per subinterval, for drawing.
    pub fn midpoint_bars<I>(&self, f: &I) -> Vec<MidpointBar>
    where
        I: Integrand + ?Sized,
    {
        let midpoints = self.midpoints();
        let heights = f.evaluate_all(midpoints.view());

        midpoints
            .iter()
            .zip(heights.iter())
            .map(|(&x, &height)| MidpointBar {
                x,
                height,
                width: self.dx,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MidpointBar {
    pub x: f64,
    pub height: f64,
    pub width: f64,
}

impl MidpointBar {
    pub fn left(&self) -> f64 {
        self.x - self.width / 2.
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.
    }
}
