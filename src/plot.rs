use std::error::Error;
use std::path::Path;

use ndarray::Array1;
use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::ResultTable;
use crate::error::ReportError;
use crate::integral::QuadratureRule;
use crate::integrand::Integrand;
use crate::partition::Partition;

const SIZE: (u32, u32) = (800, 600);
const CURVE_SAMPLES: usize = 1000;
const BAR_COLOR: RGBColor = RGBColor(255, 165, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMetric {
    Absolute,
    Squared,
}

impl ErrorMetric {
    pub fn file_name(self) -> &'static str {
        match self {
            ErrorMetric::Absolute => "mae_plot.svg",
            ErrorMetric::Squared => "mse_plot.svg",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            ErrorMetric::Absolute => "MAE",
            ErrorMetric::Squared => "MSE",
        }
    }

    fn series(self, table: &ResultTable, rule: QuadratureRule) -> Vec<(usize, f64)> {
        match self {
            ErrorMetric::Absolute => table.absolute_errors(rule),
            ErrorMetric::Squared => table.squared_errors(rule),
        }
    }
}

pub fn geometry_file_name(n: usize) -> String {
    format!("plot_n{n}.svg")
}

#[derive(Debug, Clone, Copy)]
enum Marker {
    Circle,
    Square,
    Triangle,
    Cross,
}

#[derive(Debug, Clone, Copy)]
struct RuleStyle {
    color: RGBColor,
    marker: Marker,
    filled: bool,
}

fn rule_style(rule: QuadratureRule) -> RuleStyle {
    let (color, marker, filled) = match rule {
        QuadratureRule::Left => (RGBColor(31, 119, 180), Marker::Circle, true),
        QuadratureRule::Right => (RGBColor(255, 127, 14), Marker::Square, false),
        QuadratureRule::Mid => (RGBColor(44, 160, 44), Marker::Triangle, true),
        QuadratureRule::Random => (RGBColor(214, 39, 40), Marker::Cross, false),
        QuadratureRule::Trapezoid => (RGBColor(148, 103, 189), Marker::Circle, false),
        QuadratureRule::Simpson => (RGBColor(140, 86, 75), Marker::Square, true),
    };

    RuleStyle {
        color,
        marker,
        filled,
    }
}

fn decade_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !lo.is_finite() || !hi.is_finite() {
        return (1e-16, 1.);
    }

    let lo = 10f64.powf(lo.log10().floor());
    let hi = 10f64.powf(hi.log10().ceil());

    if hi > lo {
        (lo, hi)
    } else {
        (lo / 10., hi * 10.)
    }
}

fn render_error(path: &Path, err: Box<dyn Error>) -> ReportError {
    ReportError::Render {
        path: path.to_owned(),
        message: err.to_string(),
    }
}

/// Log-log plot of one error metric against n, one line per rule.
///
/// Exact results (zero error) have no place on a log axis and are left out.
pub fn plot_errors(path: &Path, table: &ResultTable, metric: ErrorMetric) -> Result<(), ReportError> {
    let series: Vec<(QuadratureRule, Vec<(f64, f64)>)> = table
        .rules()
        .iter()
        .map(|&rule| {
            let all = metric.series(table, rule);
            let positive: Vec<(f64, f64)> = all
                .iter()
                .filter(|(_, e)| *e > 0.)
                .map(|&(n, e)| (n as f64, e))
                .collect();

            if positive.len() < all.len() {
                warn!(
                    %rule,
                    metric = metric.short_name(),
                    dropped = all.len() - positive.len(),
                    "omitting zero errors from log-scale plot"
                );
            }

            (rule, positive)
        })
        .collect();

    draw_errors(path, table, metric, &series).map_err(|err| render_error(path, err))?;

    info!(path = %path.display(), metric = metric.short_name(), "saved error plot");

    Ok(())
}

fn draw_errors(
    path: &Path,
    table: &ResultTable,
    metric: ErrorMetric,
    series: &[(QuadratureRule, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn Error>> {
    let n_min = table.n_values().iter().copied().min().unwrap_or(1) as f64;
    let n_max = table.n_values().iter().copied().max().unwrap_or(1) as f64;
    let (y_min, y_max) =
        decade_range(series.iter().flat_map(|(_, points)| points.iter().map(|&(_, e)| e)));

    let drawing_area = SVGBackend::new(path, SIZE).into_drawing_area();
    drawing_area.fill(&WHITE)?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(
            format!("{} against n", metric.short_name()),
            ("sans-serif", 20),
        )
        .margin(30)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(
            (n_min / 1.5..n_max * 1.5).log_scale(),
            (y_min..y_max).log_scale(),
        )?;

    chart_context
        .configure_mesh()
        .x_desc("Subdivisions n")
        .y_desc(metric.short_name())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0e}", y))
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (rule, points) in series {
        let RuleStyle {
            color,
            marker,
            filled,
        } = rule_style(*rule);
        let marker_style = if filled {
            color.filled()
        } else {
            color.stroke_width(2)
        };

        chart_context
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(rule.label())
            .legend(move |(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], color.stroke_width(2)));

        let points = points.iter().copied();
        match marker {
            Marker::Circle => {
                chart_context.draw_series(points.map(|p| Circle::new(p, 4, marker_style)))?;
            }
            Marker::Square => {
                chart_context.draw_series(
                    points.map(|p| EmptyElement::at(p) + Rectangle::new([(-4, -4), (4, 4)], marker_style)),
                )?;
            }
            Marker::Triangle => {
                chart_context.draw_series(points.map(|p| TriangleMarker::new(p, 5, marker_style)))?;
            }
            Marker::Cross => {
                chart_context.draw_series(points.map(|p| Cross::new(p, 4, marker_style)))?;
            }
        }
    }

    chart_context
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    drawing_area.present()?;

    Ok(())
}

/// Midpoint rectangles of `partition` drawn under the integrand's curve.
pub fn plot_midpoint_rectangles<I>(path: &Path, f: &I, partition: &Partition) -> Result<(), ReportError>
where
    I: Integrand + ?Sized,
{
    draw_midpoint_rectangles(path, f, partition).map_err(|err| render_error(path, err))?;

    info!(path = %path.display(), n = partition.n(), "saved midpoint rectangles plot");

    Ok(())
}

fn draw_midpoint_rectangles<I>(path: &Path, f: &I, partition: &Partition) -> Result<(), Box<dyn Error>>
where
    I: Integrand + ?Sized,
{
    let (a, b) = partition.interval().bounds();
    let bars = partition.midpoint_bars(f);

    let xs = Array1::linspace(a, b, CURVE_SAMPLES);
    let ys = f.evaluate_all(xs.view());
    let curve: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();

    let y_max = curve
        .iter()
        .map(|&(_, y)| y)
        .chain(bars.iter().map(|bar| bar.height))
        .fold(0f64, f64::max);
    let y_min = curve
        .iter()
        .map(|&(_, y)| y)
        .chain(bars.iter().map(|bar| bar.height))
        .fold(0f64, f64::min);
    let y_pad = 0.1 * (y_max - y_min).max(f64::EPSILON);

    let drawing_area = SVGBackend::new(path, SIZE).into_drawing_area();
    drawing_area.fill(&WHITE)?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(format!("Midpoint sum, n = {}", partition.n()), ("sans-serif", 20))
        .margin(30)
        .set_label_area_size(LabelAreaPosition::Left, 40)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(a..b, y_min - y_pad..y_max + y_pad)?;

    chart_context
        .configure_mesh()
        .x_desc("x")
        .y_desc("f(x)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart_context
        .draw_series(bars.iter().map(|bar| {
            Rectangle::new(
                [(bar.left(), 0.), (bar.right(), bar.height)],
                BAR_COLOR.mix(0.3).filled(),
            )
        }))?
        .label("Midpoint rectangles")
        .legend(|(x, y)| Rectangle::new([(x - 10, y - 5), (x + 10, y + 5)], BAR_COLOR.mix(0.3).filled()));

    chart_context.draw_series(bars.iter().map(|bar| {
        Rectangle::new(
            [(bar.left(), 0.), (bar.right(), bar.height)],
            BAR_COLOR.stroke_width(1),
        )
    }))?;

    chart_context
        .draw_series(LineSeries::new(curve, BLUE.stroke_width(2)))?
        .label(f.describe())
        .legend(|(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], BLUE.stroke_width(2)));

    chart_context
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    drawing_area.present()?;

    Ok(())
}
