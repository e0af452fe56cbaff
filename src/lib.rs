pub mod analysis;
pub mod config;
pub mod error;
pub mod integral;
pub mod integrand;
pub mod partition;
pub mod plot;
pub mod report;

pub use analysis::{analyze, build_table, ResultEntry, ResultTable};
pub use config::ExperimentConfig;
pub use error::{ConfigError, QuadratureError, ReportError};
pub use integral::{Integral, QuadratureRule};
pub use integrand::{CosSquared, Integrand};
pub use partition::{Interval, Partition};
