// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use cli_table::format::{Justify, Separator};
use cli_table::{Cell, CellStruct, ColorChoice, Table as _};

use super::{Alignment, Style};
use crate::record::Table;
use crate::{Error, Result};

/// A bordered table for verbatim display in a terminal or shell banner:
///
/// ```text
/// +-----------+-------+
/// | Partition | Nodes |
/// +-----------+-------+
/// | short     |   162 |
/// +-----------+-------+
/// ```
pub fn render(table: &Table, style: &Style) -> Result<String> {
    let alignments = style.alignments(table);
    let cells = |row: &[String]| -> Vec<CellStruct> {
        row.iter()
            .zip(alignments.iter())
            .map(|(cell, alignment)| cell.cell().justify(justify(*alignment)))
            .collect()
    };

    let header = cells(&table.columns);
    let rows: Vec<Vec<CellStruct>> = table
        .rows(style.precision)
        .iter()
        .map(|row| cells(row))
        .collect();

    let display = rows
        .table()
        .separator(
            Separator::builder()
                .title(Some(Default::default()))
                .column(Some(Default::default()))
                .build(),
        )
        .title(header)
        .color_choice(ColorChoice::Never)
        .display()
        .map_err(|e| Error::execution(format!("could not render ascii table: {e}")))?;

    let mut out = display.to_string();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

fn justify(alignment: Alignment) -> Justify {
    match alignment {
        Alignment::Left => Justify::Left,
        Alignment::Right => Justify::Right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, Value};

    fn table() -> Table {
        let records = vec![
            [("Partition", Value::from("short")), ("Nodes", Value::Int(162))]
                .into_iter()
                .collect::<Record>(),
            [("Partition", Value::from("largemem")), ("Nodes", Value::Int(7))]
                .into_iter()
                .collect::<Record>(),
        ];
        Table::from_records(records)
    }

    #[test]
    fn renders_bordered_table() {
        let out = render(&table(), &Style::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6, "{out}");
        for i in [0, 2, 5] {
            assert!(lines[i].starts_with("+-") && lines[i].ends_with("-+"), "{out}");
        }
        assert!(lines[1].contains("Partition") && lines[1].contains("Nodes"));
        assert!(lines[3].starts_with("| short "), "{out}");
        assert!(lines[3].ends_with(" 162 |"), "{out}");
        assert!(lines[4].ends_with("   7 |"), "{out}");
    }

    #[test]
    fn all_lines_have_equal_width() {
        let out = render(&table(), &Style::default()).unwrap();
        let widths: Vec<usize> = out.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{out}");
    }
}
