//! Text and JSON rendering of calculator results.

use std::fmt::Write as _;

use serde::Serialize;

use crate::calculator::{Component, MixResult};
use crate::error::Result;

/// Result as a flat list plus totals, the shape used for JSON output.
#[derive(Debug, Serialize)]
struct Report<'a> {
    components: Vec<&'a Component>,
    total_volume_ml: f64,
    total_mass_g: f64,
}

/// One `name: mass g` line per component: nicotine, VG, PG, then flavors.
#[must_use]
pub fn render_plain(result: &MixResult, precision: usize) -> String {
    let mut out = String::new();
    for component in result.components() {
        let _ = writeln!(
            out,
            "{}: {:.precision$} g",
            component.name, component.mass_g
        );
    }
    out
}

/// Aligned table with volume and mass columns and a total row.
#[must_use]
pub fn render_table(result: &MixResult, precision: usize) -> String {
    const HEADERS: [&str; 3] = ["Component", "Volume (ml)", "Mass (g)"];

    let rows: Vec<[String; 3]> = result
        .components()
        .map(|c| {
            [
                c.name.clone(),
                format!("{:.precision$}", c.volume_ml),
                format!("{:.precision$}", c.mass_g),
            ]
        })
        .collect();
    let total = [
        "Total".to_string(),
        format!("{:.precision$}", result.total_volume_ml()),
        format!("{:.precision$}", result.total_mass_g()),
    ];

    let mut widths = HEADERS.map(str::len);
    for row in rows.iter().chain(std::iter::once(&total)) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, cells: [&str; 3]| {
        let _ = writeln!(
            out,
            "{:<w0$}  {:>w1$}  {:>w2$}",
            cells[0],
            cells[1],
            cells[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        );
    };

    line(&mut out, HEADERS);
    let rule = widths.map(|w| "-".repeat(w));
    line(&mut out, [rule[0].as_str(), rule[1].as_str(), rule[2].as_str()]);
    for row in &rows {
        line(&mut out, [row[0].as_str(), row[1].as_str(), row[2].as_str()]);
    }
    line(&mut out, [rule[0].as_str(), rule[1].as_str(), rule[2].as_str()]);
    line(&mut out, [total[0].as_str(), total[1].as_str(), total[2].as_str()]);
    out
}

/// Pretty-printed JSON with every component and the totals.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(result: &MixResult) -> Result<String> {
    let report = Report {
        components: result.components().collect(),
        total_volume_ml: result.total_volume_ml(),
        total_mass_g: result.total_mass_g(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
