use std::error::Error;
use std::fs;
use std::io::Write;

use tracing::info;
use tracing_subscriber::EnvFilter;

use quadrature_convergence::partition::Partition;
use quadrature_convergence::plot::{self, ErrorMetric};
use quadrature_convergence::report;
use quadrature_convergence::{build_table, CosSquared, ExperimentConfig, Integrand, QuadratureRule};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ExperimentConfig::from_json_file(&path)?,
        None => ExperimentConfig::default(),
    };
    config.validate()?;

    let f = CosSquared;
    let true_value = config.true_value(&f);
    let mut rng = config.rng();

    info!(
        integrand = %f.describe(),
        interval = ?config.interval.bounds(),
        true_value,
        seeded = config.seed.is_some(),
        "starting quadrature run"
    );

    let table = build_table(
        &f,
        config.interval,
        &config.n_values,
        &QuadratureRule::ALL,
        true_value,
        &mut rng,
    )?;

    let mut stdout = std::io::stdout().lock();
    if let Some(n) = config.report_n() {
        report::write_table(&mut stdout, &table, n)?;
    }
    writeln!(stdout)?;
    report::write_convergence_orders(&mut stdout, &table)?;

    fs::create_dir_all(&config.output_dir)?;
    let mut written = Vec::new();

    let csv_path = config.output_dir.join("results.csv");
    report::save_csv(&csv_path, &table)?;
    written.push(csv_path);

    for metric in [ErrorMetric::Absolute, ErrorMetric::Squared] {
        let path = config.output_dir.join(metric.file_name());
        plot::plot_errors(&path, &table, metric)?;
        written.push(path);
    }

    for &n in &config.geometry_n_values {
        let partition = Partition::new(config.interval, n)?;
        let path = config.output_dir.join(plot::geometry_file_name(n));
        plot::plot_midpoint_rectangles(&path, &f, &partition)?;
        written.push(path);
    }

    writeln!(stdout, "\nSaved:")?;
    for path in written {
        writeln!(stdout, "- {}", path.display())?;
    }

    Ok(())
}
