//! SVG rendering of a [`ScaledChart`] with an optional hover tooltip.
//!
//! The output is a self-contained `<svg>` string. Series lines break at
//! gaps instead of bridging them, and isolated points are drawn as dots
//! so a one-month series is still visible.

use std::fmt::Write as _;

use sg_explorer_trend_models::{ChartPoint, ScaledChart, Tooltip};

use crate::chart::tooltip_at;
use crate::scale::format_price;

/// Stroke colors assigned to series in order, wrapping around.
pub const SERIES_COLORS: &[&str] = &["#2563eb", "#dc2626", "#16a34a", "#d97706", "#7c3aed"];

/// Text shown when there is nothing to plot.
pub const PLACEHOLDER_TEXT: &str = "No price trend data available";

const TOOLTIP_WIDTH: f64 = 168.0;
const TOOLTIP_LINE_HEIGHT: f64 = 16.0;
const TOOLTIP_OFFSET: f64 = 12.0;

/// Renders `chart` to SVG, drawing the tooltip for `hover` when it is a
/// valid month index.
#[must_use]
pub fn render_svg(chart: &ScaledChart, hover: Option<usize>) -> String {
    let layout = &chart.layout;
    let mut out = String::new();

    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img">"#,
        w = fmt_num(layout.width),
        h = fmt_num(layout.height),
    );

    if chart.is_empty() {
        let _ = write!(
            out,
            r##"<text x="{}" y="{}" text-anchor="middle" fill="#6b7280">{PLACEHOLDER_TEXT}</text></svg>"##,
            fmt_num(layout.width / 2.0),
            fmt_num(layout.height / 2.0),
        );
        return out;
    }

    write_axes(&mut out, chart);

    for (i, series) in chart.series.iter().enumerate() {
        let color = series_color(i);
        for segment in segments(&series.points) {
            if let [only] = segment.as_slice() {
                let _ = write!(
                    out,
                    r#"<circle cx="{}" cy="{}" r="3" fill="{color}"/>"#,
                    fmt_num(only.x),
                    fmt_num(only.y),
                );
            } else {
                let _ = write!(
                    out,
                    r#"<path d="{}" fill="none" stroke="{color}" stroke-width="2"/>"#,
                    path_data(&segment),
                );
            }
        }
    }

    if let Some(tooltip) = hover.and_then(|index| tooltip_at(chart, index)) {
        write_tooltip(&mut out, chart, &tooltip);
    }

    out.push_str("</svg>");
    out
}

fn series_color(index: usize) -> &'static str {
    SERIES_COLORS[index % SERIES_COLORS.len()]
}

/// Splits a gappy series into runs of consecutive points.
fn segments(points: &[Option<ChartPoint>]) -> Vec<Vec<ChartPoint>> {
    let mut runs: Vec<Vec<ChartPoint>> = Vec::new();
    let mut current: Vec<ChartPoint> = Vec::new();

    for point in points {
        match point {
            Some(p) => current.push(*p),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

fn path_data(points: &[ChartPoint]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{},{} ", fmt_num(p.x), fmt_num(p.y));
    }
    d.trim_end().to_string()
}

fn write_axes(out: &mut String, chart: &ScaledChart) {
    let layout = &chart.layout;
    let left = layout.padding.left;
    let right = layout.width - layout.padding.right;
    let baseline = layout.height - layout.padding.bottom;

    for tick in &chart.y_ticks {
        let _ = write!(
            out,
            r##"<line x1="{l}" y1="{y}" x2="{r}" y2="{y}" stroke="#e5e7eb"/><text x="{tx}" y="{y}" text-anchor="end" dominant-baseline="middle" font-size="11" fill="#6b7280">{label}</text>"##,
            l = fmt_num(left),
            r = fmt_num(right),
            y = fmt_num(tick.position),
            tx = fmt_num(left - 6.0),
            label = escape_xml(&tick.label),
        );
    }

    for tick in &chart.x_labels {
        let _ = write!(
            out,
            r##"<text x="{}" y="{}" text-anchor="middle" font-size="11" fill="#6b7280">{}</text>"##,
            fmt_num(tick.position),
            fmt_num(baseline + 18.0),
            escape_xml(&tick.label),
        );
    }
}

#[allow(clippy::cast_precision_loss)]
fn write_tooltip(out: &mut String, chart: &ScaledChart, tooltip: &Tooltip) {
    let layout = &chart.layout;
    let top = layout.padding.top;
    let baseline = layout.height - layout.padding.bottom;

    let _ = write!(
        out,
        r##"<line x1="{x}" y1="{t}" x2="{x}" y2="{b}" stroke="#9ca3af" stroke-dasharray="4 4"/>"##,
        x = fmt_num(tooltip.x),
        t = fmt_num(top),
        b = fmt_num(baseline),
    );

    for (i, entry) in tooltip.entries.iter().enumerate() {
        if let Some(y) = entry.y {
            let _ = write!(
                out,
                r##"<circle cx="{}" cy="{}" r="4" fill="{}" stroke="#ffffff" stroke-width="2"/>"##,
                fmt_num(tooltip.x),
                fmt_num(y),
                series_color(i),
            );
        }
    }

    let height = TOOLTIP_LINE_HEIGHT * (tooltip.entries.len() + 1) as f64 + 8.0;
    let box_x = if tooltip.x + TOOLTIP_OFFSET + TOOLTIP_WIDTH > layout.width - layout.padding.right
    {
        tooltip.x - TOOLTIP_OFFSET - TOOLTIP_WIDTH
    } else {
        tooltip.x + TOOLTIP_OFFSET
    };
    let box_y = top;

    let _ = write!(
        out,
        r##"<g class="tooltip"><rect x="{}" y="{}" width="{}" height="{}" rx="4" fill="#ffffff" stroke="#d1d5db"/>"##,
        fmt_num(box_x),
        fmt_num(box_y),
        fmt_num(TOOLTIP_WIDTH),
        fmt_num(height),
    );
    let _ = write!(
        out,
        r##"<text x="{}" y="{}" font-size="12" font-weight="bold" fill="#111827">{}</text>"##,
        fmt_num(box_x + 8.0),
        fmt_num(box_y + TOOLTIP_LINE_HEIGHT),
        escape_xml(&tooltip.month.label()),
    );
    for (i, entry) in tooltip.entries.iter().enumerate() {
        let value = entry.value.map_or_else(|| "No data".to_string(), format_price);
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" font-size="11" fill="{}">{}: {}</text>"#,
            fmt_num(box_x + 8.0),
            fmt_num(box_y + TOOLTIP_LINE_HEIGHT * (i + 2) as f64),
            series_color(i),
            escape_xml(&entry.label),
            escape_xml(&value),
        );
    }
    out.push_str("</g>");
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
