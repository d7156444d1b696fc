// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use super::{Alignment, Style};
use crate::record::Table;

const HEADER_SEP: &str = "!";
const VALUE_SEP: &str = "|";
const ROW_SEP: &str = "|-";

/// MediaWiki table markup.
pub fn render(table: &Table, style: &Style) -> String {
    let alignments = style.alignments(table);

    let mut lines = vec![
        "{|class=\"wikitable\"".to_string(),
        header_row(&table.columns),
    ];
    for row in table.rows(style.precision) {
        lines.push(ROW_SEP.to_string());
        lines.push(data_row(&row, &alignments));
    }
    lines.push("|}".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `!a!!b`
fn header_row(columns: &[String]) -> String {
    let row: String = columns
        .iter()
        .map(|c| format!("{HEADER_SEP}{}{HEADER_SEP}", escape(c)))
        .collect();
    strip_last(row, HEADER_SEP)
}

/// `|align="left"|a||align="right"|b`
fn data_row(cells: &[String], alignments: &[Alignment]) -> String {
    let row: String = cells
        .iter()
        .zip(alignments.iter())
        .map(|(cell, alignment)| {
            let alignment = match alignment {
                Alignment::Left => "left",
                Alignment::Right => "right",
            };
            format!(
                "{VALUE_SEP}align=\"{alignment}\"{VALUE_SEP}{}{VALUE_SEP}",
                escape(cell)
            )
        })
        .collect();
    strip_last(row, VALUE_SEP)
}

/// `|` would end the cell early.
fn escape(cell: &str) -> String {
    cell.replace('|', "&#124;")
}

fn strip_last(mut row: String, sep: &str) -> String {
    if row.ends_with(sep) {
        row.truncate(row.len() - sep.len());
    }
    row
}
