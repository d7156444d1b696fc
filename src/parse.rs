// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! parse.rs
//!
//! Parsing of `scontrol show` output into `Record`s, and decoders for the individual fields whose
//! values have their own little formats (gres strings, TRES lists, index lists, durations).

use log::{debug, warn};

use crate::record::{Record, Value};

/// Parse the text output of `scontrol show <entity>` into records.
///
/// Records are separated by blank lines (the default multi-line format) or written one per line
/// (`--oneliner`). Inside a blank-line separated block, a line that begins with the same key as
/// the block's first line starts a new record; any other line continues the current record.
///
/// Keys that appear more than once in a record have their values joined with `,`.
pub fn parse_records(text: &str) -> Vec<Record> {
    let mut records = Vec::new();

    for block in blocks(text) {
        let mut record_key: Option<String> = None;
        let mut current: Option<Vec<(String, String)>> = None;

        for line in block {
            let tokens = tokenize_line(line);
            let Some((first, _)) = tokens.first() else {
                continue;
            };

            let starts_record = match &record_key {
                Some(key) => key == first,
                None => {
                    record_key = Some(first.clone());
                    true
                }
            };
            if starts_record {
                if let Some(tokens) = current.take() {
                    records.push(build_record(tokens));
                }
            }
            current.get_or_insert_with(Vec::new).extend(tokens);
        }

        if let Some(tokens) = current {
            records.push(build_record(tokens));
        }
    }

    debug!("parsed {} records", records.len());
    records
}

/// Split text into groups of non-blank lines.
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut block = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                blocks.push(std::mem::take(&mut block));
            }
        } else {
            block.push(line);
        }
    }
    if !block.is_empty() {
        blocks.push(block);
    }
    blocks
}

fn build_record(tokens: Vec<(String, String)>) -> Record {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();
    for (key, value) in tokens {
        match fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => fields.push((key, vec![value])),
        }
    }
    fields
        .into_iter()
        .map(|(key, values)| (key, Value::infer(&values.join(","))))
        .collect()
}

/// Tokenize one line of `scontrol` output into `(key, value)` pairs, in order.
///
/// Lines look like `a=foo b=bar c=hello world d=something=actual value`: values may contain
/// spaces and `=`, but never begin with a space. The line is split on single spaces and scanned
/// from the right; pieces without `=` belong to the value of the nearest key to their left, and
/// a piece with `=` is split on its first `=` into a key and the start of its value.
///
/// A value containing a space followed by a piece with `=` cannot be told apart from a new key,
/// and is split.
///
/// Text before the first key and tokens with an empty key are skipped with a warning.
pub fn tokenize_line(line: &str) -> Vec<(String, String)> {
    let mut tokens = Vec::new();
    let mut pieces: Vec<&str> = Vec::new();

    for part in line.trim().split(' ').rev() {
        let Some((key, rest)) = part.split_once('=') else {
            pieces.push(part);
            continue;
        };
        pieces.push(rest);
        let value = pieces.iter().rev().copied().collect::<Vec<_>>().join(" ");
        pieces.clear();

        if key.is_empty() {
            warn!("skipping token with empty key: '={value}'");
            continue;
        }
        tokens.push((key.to_string(), value));
    }

    if pieces.iter().any(|p| !p.is_empty()) {
        let skipped = pieces.iter().rev().copied().collect::<Vec<_>>().join(" ");
        warn!("skipping unparseable text '{skipped}'");
    }

    tokens.reverse();
    tokens
}

/// One entry of a gres string such as `gpu:a100:2(S:0-1)` or `gpu:3(IDX:0,2-3)`.
#[derive(Debug, PartialEq)]
pub struct GresEntry {
    pub name: String,
    pub kind: Option<String>,
    pub count: i64,
    /// Indices listed in an `(IDX:...)` suffix, if there is one.
    pub indices: Option<Vec<u32>>,
}

/// Parse a gres string (`Gres=` or `GresUsed=` of `scontrol show node`). Entries that do not have
/// the form `<name>[:<type>]:<count>[(...)]` are ignored; `(null)` yields nothing.
pub fn parse_gres(gres: &str) -> Vec<GresEntry> {
    split_top_level(gres)
        .into_iter()
        .filter_map(|entry| {
            let (spec, suffix) = match entry.split_once('(') {
                Some((spec, suffix)) => (spec, Some(suffix.trim_end_matches(')'))),
                None => (entry, None),
            };
            let parts: Vec<&str> = spec.split(':').collect();
            let (name, kind, count) = match parts.as_slice() {
                [name, count] => (*name, None, *count),
                [name, kind, count] => (*name, Some(kind.to_string()), *count),
                _ => return None,
            };
            if name.is_empty() || name == "(null)" {
                return None;
            }
            let count: i64 = count.parse().ok()?;
            let indices = suffix
                .and_then(|s| s.strip_prefix("IDX:"))
                .map(expand_index_list);
            Some(GresEntry {
                name: name.to_string(),
                kind,
                count,
                indices,
            })
        })
        .collect()
}

/// Total number of GPUs configured in a `Gres=` string.
pub fn gpu_count(gres: &str) -> i64 {
    parse_gres(gres)
        .iter()
        .filter(|e| e.name == "gpu" && e.count > 0)
        .map(|e| e.count)
        .sum()
}

/// Number of GPUs in use according to a `GresUsed=` string. When an index list is present it is
/// authoritative, otherwise the declared count is used.
pub fn gpu_used_count(gres_used: &str) -> i64 {
    parse_gres(gres_used)
        .iter()
        .filter(|e| e.name == "gpu")
        .map(|e| match &e.indices {
            Some(indices) => indices.len() as i64,
            None => e.count.max(0),
        })
        .sum()
}

/// Number of GPUs in a TRES list such as `cpu=4,mem=8G,gres/gpu=2`. Only the untyped
/// `gres/gpu` entry is counted; typed entries (`gres/gpu:a100=2`) repeat the same GPUs.
pub fn tres_gpu_count(tres: &str) -> i64 {
    tres.split(',')
        .filter_map(|part| part.strip_prefix("gres/gpu="))
        .filter_map(|count| count.parse::<i64>().ok())
        .sum()
}

/// Expand a comma separated list of integers and hyphenated ranges, e.g. `1,3-6,8`, into the
/// explicit list `[1, 3, 4, 5, 6, 8]`. A range spans its smallest to its largest bound, so `3-1`
/// is `[1, 2, 3]`. Malformed pieces are dropped.
pub fn expand_index_list(list: &str) -> Vec<u32> {
    let mut out = Vec::new();
    for part in list.split(',') {
        let bounds: Option<Vec<u32>> = part.split('-').map(|b| b.parse().ok()).collect();
        let Some(bounds) = bounds else {
            continue;
        };
        if let (Some(lo), Some(hi)) = (bounds.iter().min(), bounds.iter().max()) {
            out.extend(*lo..=*hi);
        }
    }
    out
}

/// Render a Slurm duration (`[d-]hh:mm:ss`) as `<d> days, <hh> hours`, or just `<hh> hours` when it
/// is shorter than a day. `UNLIMITED` and `INFINITE` are passed through; anything else is reported
/// as an unknown duration.
pub fn format_duration(duration: &str) -> String {
    let duration = duration.trim();
    if duration == "UNLIMITED" || duration == "INFINITE" {
        return duration.to_string();
    }
    match duration_seconds(duration) {
        Some(seconds) => {
            let days = seconds / 86400;
            let hours = (seconds % 86400) / 3600;
            if days > 0 {
                format!("{days} days, {hours:>2} hours")
            } else {
                format!("{hours:>2} hours")
            }
        }
        None => "unknown duration".to_string(),
    }
}

fn duration_seconds(duration: &str) -> Option<u64> {
    let (days, clock) = match duration.split_once('-') {
        Some((days, clock)) => (days.parse::<u64>().ok()?, clock),
        None => (0, duration),
    };
    let fields: Vec<u64> = clock
        .split(':')
        .map(|f| f.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let [hours, minutes, seconds] = fields.as_slice() else {
        return None;
    };
    Some(days * 86400 + hours * 3600 + minutes * 60 + seconds)
}

/// Split on commas that are not inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}
