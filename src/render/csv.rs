// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use super::Style;
use crate::record::Table;
use crate::{Error, Result};

/// Comma separated values with a header row. Cells are quoted only when they need to be, and
/// floats keep all their digits so that the values survive being read back.
pub fn render(table: &Table, style: &Style) -> Result<String> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.columns).map_err(csv_error)?;
    for row in table.rows_with(|v| v.format_lossless(style.precision)) {
        writer.write_record(&row).map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| csv_error(e.into_error()))?;
    String::from_utf8(bytes).map_err(csv_error)
}

fn csv_error(e: impl std::fmt::Display) -> Error {
    Error::execution(format!("could not write csv: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_records;
    use crate::record::{Record, Value};
    use crate::summary;

    fn read(text: &str) -> Vec<Vec<String>> {
        ::csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn render_and_read_back() {
        let records = vec![
            [
                ("name", Value::from("c01")),
                ("partitions", Value::from("short,long")),
                ("reason", Value::from("said \"no\"")),
                ("core_count_pool", Value::Int(4)),
            ]
            .into_iter()
            .collect::<Record>(),
            [("name", Value::from("c02"))].into_iter().collect::<Record>(),
        ];
        let table = Table::from_records(records);
        let style = Style::default();
        let text = render(&table, &style).unwrap();

        assert_eq!(
            text,
            "name,partitions,reason,core_count_pool\nc01,\"short,long\",\"said \"\"no\"\"\",4\nc02,,,\n"
        );

        let mut lines = read(&text);
        assert_eq!(lines.remove(0), table.columns);
        assert_eq!(lines, table.rows(style.precision));
    }

    #[test]
    fn fractional_memory_is_not_rounded() {
        let records =
            parse_records("NodeName=c01 CPUTot=4 CPUAlloc=0 RealMemory=8160 Partitions=short");
        let table = summary::node_table(&summary::nodes(&records));
        let lines = read(&render(&table, &Style::default()).unwrap());

        let column = lines[0]
            .iter()
            .position(|c| c == "memory_gb_count_pool")
            .unwrap();
        assert_eq!(lines[1][column], "7.96875");
        assert_eq!(lines[1][column].parse::<f64>().unwrap(), 8160.0 / 1024.0);
    }
}
