use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::error::QuadratureError;
use crate::integral::{Integral, QuadratureRule};
use crate::integrand::Integrand;
use crate::partition::{Interval, Partition};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResultEntry {
    pub rule: QuadratureRule,
    pub n: usize,
    pub value: f64,
    pub absolute_error: f64,
    pub squared_error: f64,
}

impl ResultEntry {
    pub fn new(rule: QuadratureRule, n: usize, value: f64, true_value: f64) -> Self {
        let absolute_error = (value - true_value).abs();

        Self {
            rule,
            n,
            value,
            absolute_error,
            squared_error: absolute_error * absolute_error,
        }
    }
}

/// Attaches absolute and squared errors against `true_value` to each rule's approximation.
pub fn analyze(
    n: usize,
    approximations: &BTreeMap<QuadratureRule, f64>,
    true_value: f64,
) -> BTreeMap<QuadratureRule, ResultEntry> {
    approximations
        .iter()
        .map(|(&rule, &value)| (rule, ResultEntry::new(rule, n, value, true_value)))
        .collect()
}

/// Results for every `(rule, n)` pair, with `n` kept in evaluation order.
#[derive(Debug, Clone)]
pub struct ResultTable {
    true_value: f64,
    rules: Vec<QuadratureRule>,
    n_values: Vec<usize>,
    rows: Vec<BTreeMap<QuadratureRule, ResultEntry>>,
}

impl ResultTable {
    pub fn true_value(&self) -> f64 {
        self.true_value
    }

    pub fn rules(&self) -> &[QuadratureRule] {
        &self.rules
    }

    pub fn n_values(&self) -> &[usize] {
        &self.n_values
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn row(&self, n: usize) -> Option<&BTreeMap<QuadratureRule, ResultEntry>> {
        self.n_values
            .iter()
            .position(|&m| m == n)
            .map(|index| &self.rows[index])
    }

    pub fn get(&self, rule: QuadratureRule, n: usize) -> Option<&ResultEntry> {
        self.row(n).and_then(|row| row.get(&rule))
    }

    /// Entries for one `n`, in rule order.
    pub fn entries_for(&self, n: usize) -> Option<Vec<&ResultEntry>> {
        let row = self.row(n)?;

        Some(self.rules.iter().filter_map(|rule| row.get(rule)).collect())
    }

    pub fn entries(&self) -> impl Iterator<Item = &ResultEntry> + '_ {
        self.rows
            .iter()
            .flat_map(move |row| self.rules.iter().filter_map(move |rule| row.get(rule)))
    }

    pub fn absolute_errors(&self, rule: QuadratureRule) -> Vec<(usize, f64)> {
        self.series(rule, |entry| entry.absolute_error)
    }

    pub fn squared_errors(&self, rule: QuadratureRule) -> Vec<(usize, f64)> {
        self.series(rule, |entry| entry.squared_error)
    }

    fn series<F>(&self, rule: QuadratureRule, field: F) -> Vec<(usize, f64)>
    where
        F: Fn(&ResultEntry) -> f64,
    {
        self.n_values
            .iter()
            .zip(&self.rows)
            .filter_map(|(&n, row)| row.get(&rule).map(|entry| (n, field(entry))))
            .collect()
    }

    /// Observed order p between consecutive counts, from e(n₂)/e(n₁) = (n₁/n₂)^p.
    ///
    /// Pairs where either error is exactly zero are skipped.
    pub fn convergence_orders(&self, rule: QuadratureRule) -> Vec<(usize, f64)> {
        self.absolute_errors(rule)
            .windows(2)
            .filter_map(|pair| {
                let (n1, e1) = pair[0];
                let (n2, e2) = pair[1];

                if e1 > 0. && e2 > 0. {
                    Some((n2, (e1 / e2).ln() / (n2 as f64 / n1 as f64).ln()))
                } else {
                    None
                }
            })
            .collect()
    }
}

pub(crate) fn validate_n_values(n_values: &[usize]) -> Result<(), QuadratureError> {
    if n_values.is_empty() {
        return Err(QuadratureError::EmptySequence);
    }

    let mut seen = HashSet::new();
    for &n in n_values {
        if n == 0 {
            return Err(QuadratureError::ZeroSubdivisions);
        }
        if !seen.insert(n) {
            return Err(QuadratureError::DuplicateSubdivisionCount(n));
        }
    }

    Ok(())
}

/// Evaluates every rule once per `n` and collects the errors against `true_value`.
///
/// All counts are validated before anything is evaluated. A non-finite
/// result from any rule fails the whole build.
pub fn build_table<I, R>(
    f: &I,
    interval: Interval,
    n_values: &[usize],
    rules: &[QuadratureRule],
    true_value: f64,
    rng: &mut R,
) -> Result<ResultTable, QuadratureError>
where
    I: Integrand + ?Sized,
    R: Rng + ?Sized,
{
    validate_n_values(n_values)?;

    let mut unique_rules = Vec::with_capacity(rules.len());
    for &rule in rules {
        if !unique_rules.contains(&rule) {
            unique_rules.push(rule);
        }
    }

    let mut rows = Vec::with_capacity(n_values.len());
    for &n in n_values {
        let partition = Partition::new(interval, n)?;

        let approximations = unique_rules
            .iter()
            .map(|&rule| rule.integrate(f, &partition, rng).map(|value| (rule, value)))
            .collect::<Result<BTreeMap<_, _>, QuadratureError>>()?;

        rows.push(analyze(n, &approximations, true_value));
    }

    info!(
        integrand = f.describe(),
        rules = unique_rules.len(),
        subdivision_counts = n_values.len(),
        true_value,
        "built result table"
    );

    Ok(ResultTable {
        true_value,
        rules: unique_rules,
        n_values: n_values.to_vec(),
        rows,
    })
}
