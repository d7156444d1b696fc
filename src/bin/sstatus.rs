// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

use clap::Parser;

use sstatus_lib::commands::{self, Cli};

/// The sstatus binary prints one report about the state of a Slurm cluster.
fn main() {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("SSTATUS_LOG", default_filter),
    )
    .init();

    if commands::main(&args).is_err() {
        std::process::exit(1);
    }
}
