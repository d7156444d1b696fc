// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use super::{align, width, Alignment, Style};
use crate::record::Table;

/// Narrowest column, so that every column has room for a strut.
const MIN_WIDTH: usize = 2;

/// A borderless table for an Open OnDemand message of the day. The banner is Markdown, which
/// aligns columns according to the struts under the header row (`:---` left, `---:` right):
///
/// ```text
/// | Partition | Nodes |
/// | :-------- | ----: |
/// | short     |   162 |
/// ```
pub fn render(table: &Table, style: &Style) -> String {
    let alignments = style.alignments(table);
    let rows = table.rows(style.precision);

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| width(cell))
                .fold(width(c), usize::max)
                .max(MIN_WIDTH)
        })
        .collect();
    let struts: Vec<String> = widths
        .iter()
        .zip(alignments.iter())
        .map(|(w, a)| strut(*w, *a))
        .collect();

    let mut out = String::new();
    for row in std::iter::once(&table.columns)
        .chain(std::iter::once(&struts))
        .chain(rows.iter())
    {
        let cells: Vec<String> = widths
            .iter()
            .zip(alignments.iter())
            .enumerate()
            .map(|(i, (w, a))| align(row.get(i).map(String::as_str).unwrap_or(""), *w, *a))
            .collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn strut(width: usize, alignment: Alignment) -> String {
    let dashes = "-".repeat(width.saturating_sub(1));
    match alignment {
        Alignment::Left => format!(":{dashes}"),
        Alignment::Right => format!("{dashes}:"),
    }
}
