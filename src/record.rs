// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! record.rs
//!
//! The in-memory model shared by the parser, the aggregator and the renderers: a `Record` is an
//! ordered set of named `Value`s, and a `Table` is a list of records sharing one column schema.

use std::fmt;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    /// A utilization ratio, rendered as a percentage. Kept as numerator and denominator so that
    /// aggregating ratios gives a weighted percentage rather than an average of percentages.
    Ratio { num: f64, den: f64 },
}

impl Value {
    /// Infer a value from raw text. Only text whose canonical integer form is identical to the
    /// input becomes an `Int`, so that no information is lost (e.g. "007" stays text).
    pub fn infer(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Value::Int(n),
            _ => Value::Text(raw.to_string()),
        }
    }

    pub fn ratio(num: f64, den: f64) -> Self {
        Value::Ratio { num, den }
    }

    /// Numeric view of the value. Text is parsed leniently; empty or non-numeric text is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Text(s) => s.trim().parse().ok(),
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Ratio { num, den } => percentage(*num, *den).map(|p| p / 100.0),
        }
    }

    /// Render the value as text, using `precision` digits after the decimal point for floats.
    pub fn format(&self, precision: usize) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => format!("{x:.precision$}"),
            Value::Ratio { num, den } => match percentage(*num, *den) {
                Some(p) if p.fract() == 0.0 => format!("{p:.0}%"),
                Some(p) => format!("{p:.precision$}%", precision = precision.max(1)),
                None => String::new(),
            },
        }
    }

    /// Render the value for machine consumption: floats keep all their digits, everything else
    /// is rendered as by `format`.
    pub fn format_lossless(&self, precision: usize) -> String {
        match self {
            Value::Float(x) => x.to_string(),
            other => other.format(precision),
        }
    }

    /// Combine two values of a summarized field. Numbers are summed, ratios are summed
    /// component-wise, and text values are collected into a distinct, comma separated list.
    fn combine(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a.saturating_add(*b)),
            (Value::Ratio { num: a, den: b }, Value::Ratio { num: c, den: d }) => {
                Value::ratio(a + c, b + d)
            }
            (Value::Text(a), Value::Text(b)) => {
                let mut distinct: Vec<&str> = Vec::new();
                for v in a.split(',').chain(b.split(',')) {
                    if !v.is_empty() && !distinct.contains(&v) {
                        distinct.push(v);
                    }
                }
                Value::Text(distinct.join(","))
            }
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Value::Float(x + y),
                _ => a.clone(),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(1))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Text(if b { "True" } else { "False" }.to_string())
    }
}

fn percentage(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 || !num.is_finite() || !den.is_finite() {
        None
    } else {
        Some(num / den * 100.0)
    }
}

/// One node or partition, as an ordered mapping from field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get a field as text. Missing fields and non-text values are rendered with `format`.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(|v| v.format(1)).unwrap_or_default()
    }

    /// Get a field as a number; missing, empty and non-numeric fields count as zero.
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Insert a field, replacing the value of an existing field of the same name in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Records sharing a common column schema, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Table { columns, records }
    }

    /// Build a table whose columns are the union of all record keys, in order of first
    /// appearance.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records.iter() {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.to_string());
                }
            }
        }
        Table { columns, records }
    }

    /// Cells of each row, in column order, with floats rounded to `precision` digits.
    pub fn rows(&self, precision: usize) -> Vec<Vec<String>> {
        self.rows_with(|v| v.format(precision))
    }

    /// Cells of each row, in column order, rendered with `format`. Missing fields become empty
    /// cells.
    pub fn rows_with(&self, format: impl Fn(&Value) -> String) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|c| record.get(c).map(&format).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Group records by the value of `group_by`, producing one summary record per distinct value in
/// order of first appearance. The group field comes first in each summary record; every other
/// field is combined across the group: integers and floats are summed, ratios become weighted
/// percentages, and text fields are listed as their distinct values.
///
/// With no grouping field the records are returned unchanged.
pub fn aggregate(records: &[Record], group_by: Option<&str>) -> Vec<Record> {
    let Some(group_by) = group_by else {
        return records.to_vec();
    };

    let mut groups: Vec<(String, Record)> = Vec::new();
    for record in records {
        let label = record.text(group_by);
        let index = match groups.iter().position(|(l, _)| *l == label) {
            Some(i) => i,
            None => {
                let mut summary = Record::new();
                summary.insert(group_by, label.clone());
                groups.push((label, summary));
                groups.len() - 1
            }
        };
        let summary = &mut groups[index].1;
        for (key, value) in record.iter() {
            if key == group_by {
                continue;
            }
            let combined = match summary.get(key) {
                Some(current) => current.combine(value),
                None => value.clone(),
            };
            summary.insert(key, combined);
        }
    }

    groups.into_iter().map(|(_, summary)| summary).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, partition: &str, alloc: i64, tot: i64) -> Record {
        [
            ("name", Value::from(name)),
            ("partition", Value::from(partition)),
            ("alloc", Value::Int(alloc)),
            ("load", Value::ratio(alloc as f64, tot as f64)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn infer_is_lossless() {
        assert_eq!(Value::infer("4"), Value::Int(4));
        assert_eq!(Value::infer("-12"), Value::Int(-12));
        assert_eq!(Value::infer("0004"), Value::Text("0004".to_string()));
        assert_eq!(Value::infer("0.00"), Value::Text("0.00".to_string()));
        assert_eq!(Value::infer(""), Value::Text("".to_string()));
    }

    #[test]
    fn ratio_formatting() {
        assert_eq!(Value::ratio(2.0, 4.0).format(1), "50%");
        assert_eq!(Value::ratio(4.0, 4.0).format(1), "100%");
        assert_eq!(Value::ratio(1.0, 3.0).format(1), "33.3%");
        assert_eq!(Value::ratio(1.0, 0.0).format(1), "");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut record = Record::new();
        record.insert("a", 1i64);
        record.insert("b", 2i64);
        record.insert("a", 3i64);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn aggregate_without_grouping_is_identity() {
        let records = vec![node("c1", "p", 1, 4), node("c2", "q", 2, 4)];
        assert_eq!(aggregate(&records, None), records);
    }

    #[test]
    fn aggregate_sums_and_weights() {
        let records = vec![
            node("c1", "p", 1, 4),
            node("c2", "q", 2, 4),
            node("c3", "p", 3, 12),
        ];
        let summary = aggregate(&records, Some("partition"));
        assert_eq!(summary.len(), 2);

        let p = &summary[0];
        assert_eq!(p.keys().next(), Some("partition"));
        assert_eq!(p.text("partition"), "p");
        assert_eq!(p.text("name"), "c1,c3");
        assert_eq!(p.get("alloc"), Some(&Value::Int(4)));
        // 4 of 16, not the mean of 25% and 25%
        assert_eq!(p.get("load").unwrap().format(1), "25%");

        assert_eq!(summary[1].text("partition"), "q");
        assert_eq!(summary[1].get("alloc"), Some(&Value::Int(2)));
    }

    #[test]
    fn aggregate_lists_each_text_value_once() {
        let record = |parts: &str| -> Record {
            [("g", Value::from("x")), ("parts", Value::from(parts))]
                .into_iter()
                .collect()
        };
        let records = vec![record("short,long"), record("short,long"), record("long,gpu")];
        let summary = aggregate(&records, Some("g"));
        assert_eq!(summary[0].text("parts"), "short,long,gpu");
    }

    #[test]
    fn aggregate_saturates_integer_sums() {
        let record = |n: i64| -> Record {
            [("g", Value::from("x")), ("n", Value::Int(n))]
                .into_iter()
                .collect()
        };
        let summary = aggregate(&[record(i64::MAX), record(1)], Some("g"));
        assert_eq!(summary[0].get("n"), Some(&Value::Int(i64::MAX)));
    }

    #[test]
    fn lossless_floats() {
        assert_eq!(Value::Float(7.96875).format(1), "8.0");
        assert_eq!(Value::Float(7.96875).format_lossless(1), "7.96875");
        assert_eq!(Value::ratio(1.0, 3.0).format_lossless(1), "33.3%");
        assert_eq!(Value::Int(3).format_lossless(1), "3");
    }

    #[test]
    fn table_columns_follow_first_appearance() {
        let mut a = Record::new();
        a.insert("x", 1i64);
        let mut b = Record::new();
        b.insert("y", "two");
        b.insert("x", 2i64);
        let table = Table::from_records(vec![a, b]);
        assert_eq!(table.columns, vec!["x", "y"]);
        assert_eq!(
            table.rows(1),
            vec![vec!["1".to_string(), "".to_string()], vec!["2".to_string(), "two".to_string()]]
        );
    }
}
