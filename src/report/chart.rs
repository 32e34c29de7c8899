//! Chart artifact rendering.
//!
//! The chart payload is computed by the report generator; this module only
//! draws it. Output is SVG so no system fonts or image codecs are needed.

use crate::report::format::format_currency;
use crate::report::generator::ChartPayload;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::{debug, info};

const WIDTH: u32 = 1500;
const HEIGHT: u32 = 1000;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const SLATE: RGBColor = RGBColor(112, 128, 144);

/// Something that can turn a chart payload into a file.
pub trait ChartRenderer {
    fn render(&self, payload: &ChartPayload, path: &Path) -> Result<()>;
}

/// Three-panel SVG: contract types, amount histogram, top recipients.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgChartRenderer;

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, payload: &ChartPayload, path: &Path) -> Result<()> {
        debug!(
            "Rendering chart with {} types, {} buckets, {} recipients",
            payload.contract_types.len(),
            payload.histogram.len(),
            payload.top_recipients.len()
        );

        {
            let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_failed)?;
            let root = root
                .titled(&payload.title, ("sans-serif", 32))
                .map_err(draw_failed)?;

            let (upper, lower) = root.split_vertically(470);
            let (left, right) = upper.split_horizontally(750);

            let types: Vec<(String, f64)> = payload
                .contract_types
                .iter()
                .map(|t| {
                    (
                        format!("{} ({:.1}%)", t.contract_type, t.proportion * 100.0),
                        t.proportion * 100.0,
                    )
                })
                .collect();
            draw_ranking(
                &left,
                "Distribution of Contract Types",
                "Share of awards (%)",
                &types,
                SLATE,
                |v| format!("{:.0}%", v),
            )?;

            draw_histogram(&right, payload)?;

            let recipients: Vec<(String, f64)> = payload
                .top_recipients
                .iter()
                .map(|r| (r.name.clone(), r.total))
                .collect();
            draw_ranking(
                &lower,
                &format!("Top {} Recipients by Total Award Value", recipients.len()),
                "Total Award Value ($)",
                &recipients,
                LIGHT_GREEN,
                format_currency,
            )?;

            root.present()
                .with_context(|| format!("Failed to write chart to {}", path.display()))?;
        }

        info!("Chart written to {}", path.display());
        Ok(())
    }
}

fn draw_failed<E: std::fmt::Display>(err: E) -> anyhow::Error {
    anyhow::anyhow!("Chart drawing failed: {}", err)
}

/// Horizontal bars, first entry on top.
fn draw_ranking<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    caption: &str,
    x_desc: &str,
    entries: &[(String, f64)],
    color: RGBColor,
    x_format: fn(f64) -> String,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let n = entries.len().max(1) as i32;
    let x_max = entries
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(280)
        .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())
        .map_err(draw_failed)?;

    // Row 0 is drawn at the top, so labels are looked up from the end.
    let label_for = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => entries
            .get((n - 1 - *i) as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n as usize)
        .y_label_formatter(&label_for)
        .x_labels(6)
        .x_label_formatter(&|v| x_format(*v))
        .x_desc(x_desc)
        .draw()
        .map_err(draw_failed)?;

    chart
        .draw_series(entries.iter().enumerate().map(|(i, (_, value))| {
            let row = n - 1 - i as i32;
            Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(row)),
                    (*value, SegmentValue::Exact(row + 1)),
                ],
                color.filled(),
            )
        }))
        .map_err(draw_failed)?;

    Ok(())
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    payload: &ChartPayload,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let buckets = &payload.histogram;
    let (x_min, x_max) = match (buckets.first(), buckets.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let y_max = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1) as f64 * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Distribution of Award Amounts", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)
        .map_err(draw_failed)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .x_label_formatter(&|v| format_currency(*v))
        .x_desc("Award Amount ($)")
        .y_desc("Frequency")
        .draw()
        .map_err(draw_failed)?;

    chart
        .draw_series(buckets.iter().map(|b| {
            Rectangle::new(
                [(b.lower, 0.0), (b.upper, b.count as f64)],
                SKY_BLUE.filled(),
            )
        }))
        .map_err(draw_failed)?;

    chart
        .draw_series(buckets.iter().map(|b| {
            Rectangle::new(
                [(b.lower, 0.0), (b.upper, b.count as f64)],
                BLACK.stroke_width(1),
            )
        }))
        .map_err(draw_failed)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HistogramBucket;
    use crate::models::RecipientTotal;
    use crate::report::generator::ContractTypeShare;

    fn payload() -> ChartPayload {
        ChartPayload {
            title: "Award Analysis for NASA".to_string(),
            contract_types: vec![
                ContractTypeShare {
                    contract_type: "DEFINITIVE CONTRACT".to_string(),
                    count: 3,
                    proportion: 0.75,
                },
                ContractTypeShare {
                    contract_type: "PURCHASE ORDER".to_string(),
                    count: 1,
                    proportion: 0.25,
                },
            ],
            histogram: vec![
                HistogramBucket {
                    lower: 0.0,
                    upper: 50.0,
                    count: 3,
                },
                HistogramBucket {
                    lower: 50.0,
                    upper: 100.0,
                    count: 1,
                },
            ],
            top_recipients: vec![
                RecipientTotal {
                    name: "ACME".to_string(),
                    total: 120.0,
                },
                RecipientTotal {
                    name: "GLOBEX".to_string(),
                    total: 80.0,
                },
            ],
        }
    }

    #[test]
    fn test_render_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("award_analysis.svg");

        SvgChartRenderer.render(&payload(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Award Analysis for NASA"));
        assert!(svg.contains("ACME"));
    }

    #[test]
    fn test_render_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        std::fs::write(&path, "stale").unwrap();

        SvgChartRenderer.render(&payload(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(!svg.contains("stale"));
    }
}
