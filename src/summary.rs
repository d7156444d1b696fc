// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! summary.rs
//!
//! Turns parsed `scontrol` records into the tables sstatus reports: per-node resource usage,
//! resource summaries for the whole cluster or per partition, load percentages, and the
//! partition overview.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::parse::{format_duration, gpu_count, gpu_used_count, tres_gpu_count};
use crate::record::{aggregate, Record, Table, Value};
use crate::Error;

const MB_PER_GB: f64 = 1024.0;

/// Column holding the partition membership of a node, and the grouping key for summaries.
pub const PARTITIONS: &str = "partitions";

/// How node summaries are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One summary for the whole cluster.
    All,
    /// One summary per distinct partition membership.
    Partitions,
}

impl FromStr for Grouping {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Grouping::All),
            "partitions" => Ok(Grouping::Partitions),
            other => Err(Error::configuration(format!(
                "unknown summary '{other}', expected one of: all, partitions"
            ))),
        }
    }
}

/// The resources tracked for every node. Nodes themselves are counted as a resource too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Node,
    Core,
    MemoryGb,
    Gpu,
}

pub const RESOURCES: [Resource; 4] = [
    Resource::Node,
    Resource::Core,
    Resource::MemoryGb,
    Resource::Gpu,
];

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Resource::Node => "node",
                Resource::Core => "core",
                Resource::MemoryGb => "memory_gb",
                Resource::Gpu => "gpu",
            }
        )
    }
}

impl Resource {
    /// Wrap an amount of this resource in a value of the right type: memory is fractional, all
    /// other resources are counted.
    fn amount(&self, x: f64) -> Value {
        match self {
            Resource::MemoryGb => Value::Float(x),
            _ => Value::Int(x.round() as i64),
        }
    }

    fn column(&self, subset: &str) -> String {
        format!("{self}_count_{subset}")
    }
}

/// Amount of one resource on a node: what the scheduler may hand out, and what it has handed out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Usage {
    pub pool: f64,
    pub allocated: f64,
}

impl Usage {
    pub fn idle(&self) -> f64 {
        self.pool - self.allocated
    }
}

/// Resource usage of a single node, decoded from a `scontrol show node` record.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUsage {
    pub name: String,
    pub state: String,
    pub reason: String,
    pub partitions: String,
    /// Nodes that have a reason set (drained, down, ...) are unavailable.
    pub available: bool,
    pub cores: Usage,
    pub memory_gb: Usage,
    pub gpus: Usage,
}

impl NodeUsage {
    pub fn from_record(record: &Record) -> Self {
        let reason = record.text("Reason");
        let memory_pool = record.number("RealMemory") - record.number("MemSpecLimit");
        let gpus_allocated = match record.get("AllocTRES") {
            Some(tres) => tres_gpu_count(&tres.format(0)),
            None => gpu_used_count(&record.text("GresUsed")),
        };

        NodeUsage {
            name: record.text("NodeName"),
            state: record.text("State"),
            available: reason.is_empty(),
            reason,
            partitions: record.text("Partitions"),
            cores: Usage {
                pool: record.number("CPUTot"),
                allocated: record.number("CPUAlloc"),
            },
            memory_gb: Usage {
                pool: memory_pool / MB_PER_GB,
                allocated: record.number("AllocMem") / MB_PER_GB,
            },
            gpus: Usage {
                pool: gpu_count(&record.text("Gres")) as f64,
                allocated: gpus_allocated as f64,
            },
        }
    }

    pub fn usage(&self, resource: Resource) -> Usage {
        match resource {
            Resource::Node => Usage {
                pool: 1.0,
                allocated: if self.cores.allocated > 0.0 { 1.0 } else { 0.0 },
            },
            Resource::Core => self.cores,
            Resource::MemoryGb => self.memory_gb,
            Resource::Gpu => self.gpus,
        }
    }

    /// The node's row in the node table.
    fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("name", self.name.as_str());
        record.insert("state", self.state.as_str());
        record.insert("available", self.available);
        record.insert("reason", self.reason.as_str());
        record.insert(PARTITIONS, self.partitions.as_str());
        for resource in [Resource::Core, Resource::MemoryGb, Resource::Gpu] {
            let usage = self.usage(resource);
            record.insert(resource.column("pool"), resource.amount(usage.pool));
            record.insert(resource.column("allocated"), resource.amount(usage.allocated));
            record.insert(resource.column("idle"), resource.amount(usage.idle()));
            if resource == Resource::Core {
                record.insert(
                    "CPUAlloc/CPUTot",
                    Value::ratio(self.cores.allocated, self.cores.pool),
                );
            }
        }
        record
    }

    /// Counts this node contributes to a summary. Totals count every node; the pool, allocated
    /// and idle subsets only count available nodes.
    fn to_count_record(&self, label: &str) -> Record {
        let mut record = Record::new();
        record.insert(PARTITIONS, label);
        for resource in RESOURCES {
            let usage = self.usage(resource);
            let usage_if_available = if self.available {
                usage
            } else {
                Usage::default()
            };
            record.insert(resource.column("total"), resource.amount(usage.pool));
            record.insert(resource.column("pool"), resource.amount(usage_if_available.pool));
            record.insert(
                resource.column("allocated"),
                resource.amount(usage_if_available.allocated),
            );
            record.insert(
                resource.column("idle"),
                resource.amount(usage_if_available.idle()),
            );
        }
        record
    }
}

/// Decode every node record.
pub fn nodes(records: &[Record]) -> Vec<NodeUsage> {
    records.iter().map(NodeUsage::from_record).collect()
}

/// One row per node.
pub fn node_table(nodes: &[NodeUsage]) -> Table {
    let mut columns: Vec<String> = ["name", "state", "available", "reason", PARTITIONS]
        .iter()
        .map(|c| c.to_string())
        .collect();
    for resource in [Resource::Core, Resource::MemoryGb, Resource::Gpu] {
        for subset in ["pool", "allocated", "idle"] {
            columns.push(resource.column(subset));
        }
        if resource == Resource::Core {
            columns.push("CPUAlloc/CPUTot".to_string());
        }
    }
    Table::new(columns, nodes.iter().map(NodeUsage::to_record).collect())
}

/// Summed amounts of one resource over a group of nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub allocated: f64,
    pub idle: f64,
    pub pool: f64,
    pub total: f64,
}

impl Totals {
    pub fn unavailable(&self) -> f64 {
        self.total - self.pool
    }
}

/// The summary of one group of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// The group's partition membership; `None` when summarizing the whole cluster.
    pub label: Option<String>,
    pub totals: Vec<(Resource, Totals)>,
}

impl GroupSummary {
    pub fn totals(&self, resource: Resource) -> Totals {
        self.totals
            .iter()
            .find(|(r, _)| *r == resource)
            .map(|(_, t)| *t)
            .unwrap_or(Totals {
                allocated: 0.0,
                idle: 0.0,
                pool: 0.0,
                total: 0.0,
            })
    }
}

/// Summarize nodes, either all together or grouped by partition membership.
///
/// Nodes that belong to no partition are left out, as are nodes whose name does not match
/// `compute_nodes` when it is given. Each node belongs to exactly one group: a node in several
/// partitions is grouped under its full membership list.
pub fn summarize(
    nodes: &[NodeUsage],
    grouping: Grouping,
    compute_nodes: Option<&Regex>,
) -> Vec<GroupSummary> {
    let counts: Vec<Record> = nodes
        .iter()
        .filter(|node| !node.partitions.is_empty())
        .filter(|node| compute_nodes.map_or(true, |re| re.is_match(&node.name)))
        .map(|node| {
            let label = match grouping {
                Grouping::All => "",
                Grouping::Partitions => node.partitions.as_str(),
            };
            node.to_count_record(label)
        })
        .collect();

    let mut groups = aggregate(&counts, Some(PARTITIONS));
    if groups.is_empty() && grouping == Grouping::All {
        groups.push(Record::new());
    }

    groups
        .iter()
        .map(|group| GroupSummary {
            label: match grouping {
                Grouping::All => None,
                Grouping::Partitions => Some(group.text(PARTITIONS)),
            },
            totals: RESOURCES
                .iter()
                .map(|resource| {
                    let totals = Totals {
                        allocated: group.number(&resource.column("allocated")),
                        idle: group.number(&resource.column("idle")),
                        pool: group.number(&resource.column("pool")),
                        total: group.number(&resource.column("total")),
                    };
                    (*resource, totals)
                })
                .collect(),
        })
        .collect()
}

fn leading_columns(summaries: &[GroupSummary], first: &str) -> Vec<String> {
    let grouped = summaries.iter().any(|s| s.label.is_some());
    let mut columns = Vec::new();
    if grouped {
        columns.push(PARTITIONS.to_string());
    }
    columns.push(first.to_string());
    columns
}

/// One row per group and resource, with the allocated, idle, pool, unavailable and total amounts.
pub fn summary_table(summaries: &[GroupSummary]) -> Table {
    let mut columns = leading_columns(summaries, "resource");
    columns.extend(
        ["allocated", "idle", "pool", "unavailable", "total"]
            .iter()
            .map(|c| c.to_string()),
    );

    let mut records = Vec::new();
    for summary in summaries {
        for (resource, totals) in summary.totals.iter() {
            let mut record = Record::new();
            if let Some(label) = &summary.label {
                record.insert(PARTITIONS, label.as_str());
            }
            record.insert("resource", resource.to_string());
            record.insert("allocated", resource.amount(totals.allocated));
            record.insert("idle", resource.amount(totals.idle));
            record.insert("pool", resource.amount(totals.pool));
            record.insert("unavailable", resource.amount(totals.unavailable()));
            record.insert("total", resource.amount(totals.total));
            records.push(record);
        }
    }
    Table::new(columns, records)
}

/// The ratios reported by the load table, as (name, numerator, denominator).
const LOAD_RATIOS: [(&str, fn(&Totals) -> f64, fn(&Totals) -> f64); 6] = [
    ("allocated/pool", |t| t.allocated, |t| t.pool),
    ("idle/pool", |t| t.idle, |t| t.pool),
    ("allocated/total", |t| t.allocated, |t| t.total),
    ("idle/total", |t| t.idle, |t| t.total),
    ("pool/total", |t| t.pool, |t| t.total),
    ("unavailable/total", Totals::unavailable, |t| t.total),
];

/// Load percentages: one row per group and ratio, one column per resource.
pub fn load_table(summaries: &[GroupSummary]) -> Table {
    let mut columns = leading_columns(summaries, "ratio");
    columns.extend(RESOURCES.iter().map(|r| r.to_string()));

    let mut records = Vec::new();
    for summary in summaries {
        for (name, numerator, denominator) in LOAD_RATIOS {
            let mut record = Record::new();
            if let Some(label) = &summary.label {
                record.insert(PARTITIONS, label.as_str());
            }
            record.insert("ratio", name);
            for resource in RESOURCES {
                let totals = summary.totals(resource);
                record.insert(
                    resource.to_string(),
                    Value::ratio(numerator(&totals), denominator(&totals)),
                );
            }
            records.push(record);
        }
    }
    Table::new(columns, records)
}

/// One row per partition, highest priority tier first.
pub fn partition_table(records: &[Record]) -> Table {
    let columns: Vec<String> = [
        "Partition",
        "Nodes",
        "Nodes Per Researcher",
        "Time Limit",
        "Priority Tier",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    let mut partitions: Vec<&Record> = records.iter().collect();
    let tier = |r: &Record| r.get("PriorityTier").and_then(Value::as_f64);
    partitions.sort_by(|a, b| {
        tier(b)
            .partial_cmp(&tier(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let field = |r: &Record, key: &str| r.get(key).cloned().unwrap_or(Value::from(""));
    let rows = partitions
        .into_iter()
        .map(|r| {
            let mut record = Record::new();
            record.insert("Partition", field(r, "PartitionName"));
            record.insert("Nodes", field(r, "TotalNodes"));
            record.insert("Nodes Per Researcher", field(r, "MaxNodes"));
            record.insert("Time Limit", format_duration(&r.text("MaxTime")));
            record.insert("Priority Tier", field(r, "PriorityTier"));
            record
        })
        .collect();

    Table::new(columns, rows)
}
