// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

pub mod load;
pub mod nodes;
pub mod partitions;

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use log::debug;

use crate::config::Config;
use crate::parse::parse_records;
use crate::record::{Record, Table};
use crate::render::{self, Format, Style};
use crate::scontrol::{self, Scontrol, Source};
use crate::summary::Grouping;
use crate::{Error, Result};

/// A `HandledError` represents an error that has already been handled. When you call a function
/// that returns a `HandledError` or `HandledResult`, you don't need to do anything with that error,
/// other than just be aware that it happened, and return it on to your caller.
///
/// `main()` has a special responsibility: since its "caller" is, in a certain sense, the operating
/// system, `main()` must return a nonzero exit status when it gets a `HandledError`.
///
/// The primary way to construct a `HandledError` is with the `handle_err()` function, which turns a
/// generic error into a `HandledError`, and also runs some caller-provided code to handle the
/// error. That provided code would normally do something like report the error to stderr.
#[derive(Debug, PartialEq)]
pub struct HandledError {}

pub type HandledResult<T> = std::result::Result<T, HandledError>;

pub trait Handle<T, F> {
    fn handle_err(self, handler: F) -> HandledResult<T>;
}

impl<T, E, F: FnOnce(E)> Handle<T, F> for std::result::Result<T, E> {
    /// Handle an error by running the provided `handler` code, giving it the error.
    ///
    /// Then, return a `HandledResult`, so that transitive callers of this function know that they
    /// do not need to do anything further to handle the error.
    fn handle_err(self, handler: F) -> HandledResult<T> {
        self.map_err(|e| {
            handler(e);
            HandledError {}
        })
    }
}

/// Reports node, partition and load information of a Slurm cluster as csv, ascii, mediawiki or
/// message-of-the-day tables.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// What to report: "nodes", "load" or "partitions".
    #[arg(short, long, default_value = "load")]
    pub command: String,

    /// Summarize nodes: "all" or "partitions". Only valid for "nodes" and "load".
    #[arg(short, long)]
    pub summary: Option<String>,

    /// Output format: "csv", "ascii", "mediawiki" or "motd".
    #[arg(short, long, default_value = "csv")]
    pub format: String,

    /// Only report these nodes, in nodeset notation (e.g. 'c[0001-0016]').
    #[arg(short, long)]
    pub nodes: Vec<String>,

    #[arg(long)]
    pub config: Option<String>,

    /// Read scontrol output saved by --save-snapshot instead of running scontrol.
    #[arg(long, value_name = "DIR")]
    pub from_snapshot: Option<PathBuf>,

    /// Save the scontrol output of this run to DIR.
    #[arg(long, value_name = "DIR")]
    pub save_snapshot: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

/// The reports sstatus can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Nodes,
    Load,
    Partitions,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Command::Nodes => "nodes",
                Command::Load => "load",
                Command::Partitions => "partitions",
            }
        )
    }
}

impl FromStr for Command {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nodes" => Ok(Command::Nodes),
            "load" => Ok(Command::Load),
            "partitions" => Ok(Command::Partitions),
            other => Err(Error::configuration(format!(
                "unknown command '{other}', expected one of: nodes, load, partitions"
            ))),
        }
    }
}

/// A validated set of command line arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub command: Command,
    pub summary: Option<Grouping>,
    pub format: Format,
}

impl Request {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let command: Command = cli.command.parse()?;
        let summary = cli
            .summary
            .as_deref()
            .map(Grouping::from_str)
            .transpose()?;
        let format: Format = cli.format.parse()?;

        if command == Command::Partitions {
            if summary.is_some() {
                return Err(Error::configuration(
                    "--summary is only valid with --command nodes or load",
                ));
            }
            if !cli.nodes.is_empty() {
                return Err(Error::configuration(
                    "--nodes is only valid with --command nodes or load",
                ));
            }
        }
        if cli.from_snapshot.is_some() && cli.save_snapshot.is_some() {
            return Err(Error::configuration(
                "--from-snapshot and --save-snapshot cannot be combined",
            ));
        }

        Ok(Request {
            command,
            summary,
            format,
        })
    }
}

/// Everything a command needs to query the cluster.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub scontrol: Scontrol,
    save_snapshot: Option<PathBuf>,
    nodes: Option<HashSet<String>>,
}

impl Context {
    pub fn new(cli: &Cli, config: Config) -> Result<Self> {
        let scontrol = match &cli.from_snapshot {
            Some(dir) => Scontrol::Snapshot(dir.clone()),
            None => Scontrol::Command(config.scontrol.clone()),
        };
        let nodes = if cli.nodes.is_empty() {
            None
        } else {
            let hostnames = nodesets2hostnames(&cli.nodes)
                .map_err(|e| Error::configuration(format!("invalid nodeset: {e:?}")))?;
            Some(hostnames.into_iter().collect())
        };
        Ok(Context {
            config,
            scontrol,
            save_snapshot: cli.save_snapshot.clone(),
            nodes,
        })
    }

    /// Query one source and parse its records, saving the raw output first if requested.
    pub fn records(&self, source: Source) -> Result<Vec<Record>> {
        let text = self.scontrol.show(source)?;
        if let Some(dir) = &self.save_snapshot {
            scontrol::write_snapshot(dir, source, &text)?;
        }
        let records = parse_records(&text);
        debug!("{} {source} records", records.len());
        Ok(records)
    }

    /// Whether the node should be reported, according to `--nodes`.
    pub fn wants_node(&self, name: &str) -> bool {
        match &self.nodes {
            Some(nodes) => nodes.contains(name),
            None => true,
        }
    }
}

/// Convert multiple nodeset strings into a single, deduplicated NodeSet object.
/// A "nodeset" is a string representing shorthand notation for a group of hosts (e.g.,
/// 'node[00-05]').
fn merge_nodesets(
    nodesets: &[String],
) -> std::result::Result<nodeset::NodeSet, nodeset::NodeSetParseError> {
    let mut nodeset = nodeset::NodeSet::new();
    for nodeset_str in nodesets.iter() {
        let curr_nodeset = &nodeset_str.parse()?;
        nodeset = nodeset.union(curr_nodeset);
    }
    Ok(nodeset)
}

/// Convert multiple nodesets into a vector of hostname strings.
fn nodesets2hostnames(
    nodesets: &[String],
) -> std::result::Result<Vec<String>, nodeset::NodeSetParseError> {
    Ok(merge_nodesets(nodesets)?.iter().collect())
}

/// Build the table a request asks for.
pub fn table(request: &Request, context: &Context) -> Result<Table> {
    debug!("Building {} table", request.command);
    match request.command {
        Command::Nodes => nodes::nodes(context, request.summary),
        Command::Load => load::load(context, request.summary.unwrap_or(Grouping::All)),
        Command::Partitions => partitions::partitions(context),
    }
}

/// Run sstatus with the given arguments, returning the rendered report.
pub fn run(cli: &Cli) -> Result<String> {
    let config = Config::load(cli.config.as_deref())?;
    let request = Request::from_cli(cli)?;
    let context = Context::new(cli, config)?;
    let table = table(&request, &context)?;
    render::render(&table, request.format, &Style::from(&context.config))
}

pub fn main(cli: &Cli) -> HandledResult<()> {
    let report = run(cli).handle_err(|e| eprintln!("{e}"))?;
    print!("{report}");
    Ok(())
}
