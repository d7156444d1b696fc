// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use crate::commands::{nodes::node_usage, Context};
use crate::record::Table;
use crate::summary::{self, Grouping};
use crate::Result;

/// Allocation and availability percentages of every resource, for the whole cluster or per
/// partition.
pub fn load(context: &Context, grouping: Grouping) -> Result<Table> {
    let nodes = node_usage(context)?;
    let compute_nodes = context.config.compute_node_regex()?;
    let summaries = summary::summarize(&nodes, grouping, compute_nodes.as_ref());
    Ok(summary::load_table(&summaries))
}
