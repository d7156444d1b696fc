// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! render
//!
//! Serializes a `Table` into one of the supported output formats.

pub mod ascii;
pub mod csv;
pub mod mediawiki;
pub mod motd;

use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::record::Table;
use crate::{Error, Result};

/// Output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Ascii,
    MediaWiki,
    Motd,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Format::Csv => "csv",
                Format::Ascii => "ascii",
                Format::MediaWiki => "mediawiki",
                Format::Motd => "motd",
            }
        )
    }
}

impl FromStr for Format {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "ascii" => Ok(Format::Ascii),
            "mediawiki" => Ok(Format::MediaWiki),
            "motd" => Ok(Format::Motd),
            other => Err(Error::configuration(format!(
                "unknown output format '{other}', expected one of: csv, ascii, mediawiki, motd"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// Presentation options shared by all formats.
#[derive(Debug, Clone)]
pub struct Style {
    /// Digits after the decimal point for floats.
    pub precision: usize,
    pub left_aligned: Vec<String>,
}

impl Default for Style {
    fn default() -> Self {
        Style::from(&Config::default())
    }
}

impl From<&Config> for Style {
    fn from(config: &Config) -> Self {
        Style {
            precision: config.precision,
            left_aligned: config.left_aligned_columns.clone(),
        }
    }
}

impl Style {
    pub fn alignments(&self, table: &Table) -> Vec<Alignment> {
        table
            .columns
            .iter()
            .map(|c| {
                if self.left_aligned.iter().any(|l| l == c) {
                    Alignment::Left
                } else {
                    Alignment::Right
                }
            })
            .collect()
    }
}

/// Render `table` in the given format.
pub fn render(table: &Table, format: Format, style: &Style) -> Result<String> {
    match format {
        Format::Csv => csv::render(table, style),
        Format::Ascii => ascii::render(table, style),
        Format::MediaWiki => Ok(mediawiki::render(table, style)),
        Format::Motd => Ok(motd::render(table, style)),
    }
}

/// Display width of a cell.
fn width(s: &str) -> usize {
    s.chars().count()
}

/// Pad `cell` to `width` characters.
fn align(cell: &str, width: usize, alignment: Alignment) -> String {
    match alignment {
        Alignment::Left => format!("{cell:<width$}"),
        Alignment::Right => format!("{cell:>width$}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        for format in [Format::Csv, Format::Ascii, Format::MediaWiki, Format::Motd] {
            assert_eq!(format.to_string().parse::<Format>(), Ok(format));
        }
        assert_eq!("CSV".parse::<Format>(), Ok(Format::Csv));
    }

    #[test]
    fn unknown_format_is_configuration_error() {
        assert!(matches!("html".parse::<Format>(), Err(Error::Configuration(_))));
    }
}
