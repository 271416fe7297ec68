// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tab-separated sweep report.
//!
//! ```text
//! dimension  alpha  sample_size  sigma  theoretical_value  <7 columns per labelled set>  <7 combined columns>
//! ```
//!
//! Every evaluated index set but the last gets a block whose column names end
//! in its label; the last (combined) block is unlabelled. Each row is flushed
//! as soon as it is written.

use std::io::{self, Write};

use super::CellResult;
use crate::estimators::IndexSet;

const LEADING_COLUMNS: [&str; 5] = ["dimension", "alpha", "sample_size", "sigma", "theoretical_value"];

const BLOCK_COLUMNS: [&str; 7] = [
    "mean Renyi entropy",
    "std Renyi entropy",
    "mean computer time",
    "std computer time",
    "mean difference",
    "std of difference",
    "3rd moment of difference",
];

/// Column names for a sweep evaluating `index_sets` (combined set last).
pub fn header_columns(index_sets: &[IndexSet]) -> Vec<String> {
    let mut columns: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    let labelled = index_sets.len().saturating_sub(1);
    for set in &index_sets[..labelled] {
        let label = set.label();
        columns.extend(BLOCK_COLUMNS.iter().map(|c| format!("{c} {label}")));
    }
    columns.extend(BLOCK_COLUMNS.iter().map(|c| c.to_string()));
    columns
}

/// Shortest round-trip formatting, with `nan` for missing statistics.
fn format_float(value: f64) -> String {
    if value.is_nan() { "nan".to_string() } else { value.to_string() }
}

/// Streams sweep results to any [`Write`] sink.
pub struct ReportWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, rows: 0 }
    }

    pub fn write_header(&mut self, index_sets: &[IndexSet]) -> io::Result<()> {
        writeln!(self.inner, "{}", header_columns(index_sets).join("\t"))?;
        self.inner.flush()
    }

    pub fn write_row(&mut self, result: &CellResult) -> io::Result<()> {
        let cell = &result.cell;
        let mut fields = vec![
            cell.dimension.to_string(),
            format_float(cell.alpha),
            cell.sample_size.to_string(),
            format_float(cell.sigma),
            format_float(result.oracle),
        ];
        for (_, record) in &result.records {
            fields.extend(record.columns().iter().map(|&v| format_float(v)));
        }
        writeln!(self.inner, "{}", fields.join("\t"))?;
        self.rows += 1;
        self.inner.flush()
    }

    /// Data rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
