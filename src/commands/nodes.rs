// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use log::debug;

use crate::commands::Context;
use crate::record::Table;
use crate::scontrol::Source;
use crate::summary::{self, Grouping, NodeUsage};
use crate::Result;

/// Resource usage of the nodes selected by `--nodes` (all nodes by default).
pub fn node_usage(context: &Context) -> Result<Vec<NodeUsage>> {
    let records = context.records(Source::Node)?;
    let nodes: Vec<NodeUsage> = summary::nodes(&records)
        .into_iter()
        .filter(|node| context.wants_node(&node.name))
        .collect();
    debug!("{} of {} nodes selected", nodes.len(), records.len());
    Ok(nodes)
}

/// The per-node table, or a summary of it when `grouping` is given.
pub fn nodes(context: &Context, grouping: Option<Grouping>) -> Result<Table> {
    let nodes = node_usage(context)?;
    match grouping {
        None => Ok(summary::node_table(&nodes)),
        Some(grouping) => {
            let compute_nodes = context.config.compute_node_regex()?;
            let summaries = summary::summarize(&nodes, grouping, compute_nodes.as_ref());
            Ok(summary::summary_table(&summaries))
        }
    }
}
