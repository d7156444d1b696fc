// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use crate::commands::Context;
use crate::record::Table;
use crate::scontrol::Source;
use crate::summary;
use crate::Result;

pub fn partitions(context: &Context) -> Result<Table> {
    let records = context.records(Source::Partition)?;
    Ok(summary::partition_table(&records))
}
