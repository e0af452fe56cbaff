use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::analysis::ResultTable;
use crate::error::ReportError;

/// Writes the per-rule results for one subdivision count as an aligned text table.
pub fn write_table<W>(out: &mut W, table: &ResultTable, n: usize) -> Result<(), ReportError>
where
    W: Write,
{
    let entries = table
        .entries_for(n)
        .ok_or(ReportError::MissingSubdivisionCount(n))?;

    writeln!(
        out,
        "Results for n = {n} (exact value {:.12}):",
        table.true_value()
    )?;
    writeln!(out, "{:<26}{:<18}{:<12}{:<12}", "Method", "Value", "MAE", "MSE")?;
    writeln!(out, "{}", "-".repeat(66))?;

    for entry in entries {
        writeln!(
            out,
            "{:<26}{:<18.12}{:<12.2e}{:<12.2e}",
            entry.rule.label(),
            entry.value,
            entry.absolute_error,
            entry.squared_error
        )?;
    }

    Ok(())
}

/// Writes the observed convergence order of every rule between consecutive counts.
pub fn write_convergence_orders<W>(out: &mut W, table: &ResultTable) -> Result<(), ReportError>
where
    W: Write,
{
    writeln!(out, "Observed order of convergence (n: p):")?;

    for &rule in table.rules() {
        let orders = table
            .convergence_orders(rule)
            .into_iter()
            .map(|(n, p)| format!("{n}: {p:.2}"))
            .collect::<Vec<_>>();

        let orders = if orders.is_empty() {
            "-".to_owned()
        } else {
            orders.join(", ")
        };

        writeln!(out, "{:<26}{}", rule.label(), orders)?;
    }

    Ok(())
}

pub fn write_csv<W>(writer: W, table: &ResultTable) -> Result<(), ReportError>
where
    W: Write,
{
    let mut csv_writer = csv::Writer::from_writer(writer);

    for entry in table.entries() {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;

    Ok(())
}

pub fn save_csv(path: &Path, table: &ResultTable) -> Result<(), ReportError> {
    write_csv(std::fs::File::create(path)?, table)?;

    info!(path = %path.display(), entries = table.len(), "saved results table");

    Ok(())
}
