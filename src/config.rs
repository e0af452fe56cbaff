use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::analysis::validate_n_values;
use crate::error::{ConfigError, QuadratureError};
use crate::integrand::Integrand;
use crate::partition::Interval;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub interval: Interval,
    pub n_values: Vec<usize>,
    /// Counts for which the midpoint rectangles are drawn.
    pub geometry_n_values: Vec<usize>,
    /// Count shown in the console table; the largest of `n_values` when unset.
    pub report_n: Option<usize>,
    /// Overrides the integrand's closed-form integral.
    pub true_value: Option<f64>,
    pub seed: Option<u64>,
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            interval: Interval::ZERO_TO_PI,
            n_values: (0..=10).map(|k| 1 << k).collect(),
            geometry_n_values: vec![4, 8, 16],
            report_n: None,
            true_value: None,
            seed: None,
            output_dir: PathBuf::from("plots"),
        }
    }
}

impl ExperimentConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = serde_json::from_reader(reader)?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_n_values(&self.n_values)?;

        if self.geometry_n_values.contains(&0) {
            return Err(QuadratureError::ZeroSubdivisions.into());
        }

        if let Some(n) = self.report_n {
            if !self.n_values.contains(&n) {
                return Err(ConfigError::UnknownReportN(n));
            }
        }

        Ok(())
    }

    pub fn report_n(&self) -> Option<usize> {
        self.report_n.or_else(|| self.n_values.iter().copied().max())
    }

    pub fn true_value<I>(&self, f: &I) -> f64
    where
        I: Integrand + ?Sized,
    {
        self.true_value
            .unwrap_or_else(|| f.exact_integral(self.interval))
    }

    /// The single generator shared by every draw of a run.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
