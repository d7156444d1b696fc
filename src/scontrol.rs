// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

//! scontrol.rs
//!
//! Runs `scontrol` to capture the raw state of the cluster, or replays a snapshot of a previous
//! capture from disk.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::{Error, Result};

/// The entities that can be queried with `scontrol show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Node,
    Partition,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Source::Node => "node",
                Source::Partition => "partition",
            }
        )
    }
}

impl Source {
    /// Name of the file holding this source's output inside a snapshot directory.
    pub fn snapshot_file_name(&self) -> String {
        format!("{self}.txt")
    }
}

/// Where raw `scontrol` output comes from.
#[derive(Debug, Clone)]
pub enum Scontrol {
    /// Run the given executable.
    Command(String),
    /// Read the output saved by an earlier run from a snapshot directory.
    Snapshot(PathBuf),
}

impl Scontrol {
    /// Get the raw text describing every entity of the given kind.
    pub fn show(&self, source: Source) -> Result<String> {
        match self {
            Scontrol::Command(executable) => run(executable, source),
            Scontrol::Snapshot(dir) => read_snapshot(dir, source),
        }
    }
}

fn run(executable: &str, source: Source) -> Result<String> {
    let source_arg = source.to_string();
    let args = ["--oneliner", "show", source_arg.as_str()];
    debug!("Running command `{executable} {}`", args.join(" "));

    let output = Command::new(executable)
        .args(args)
        .output()
        .map_err(|e| Error::execution(format!("could not run command '{executable}': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::execution(format!(
            "'{executable} {}' failed with {}: {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn read_snapshot(dir: &Path, source: Source) -> Result<String> {
    let path = dir.join(source.snapshot_file_name());
    debug!("Reading snapshot file '{}'", path.display());
    fs::read_to_string(&path).map_err(|e| {
        Error::execution(format!("could not read snapshot file '{}': {e}", path.display()))
    })
}

/// Save the raw output of one source into a snapshot directory, creating the directory if needed.
pub fn write_snapshot(dir: &Path, source: Source, contents: &str) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        Error::execution(format!("could not create snapshot directory '{}': {e}", dir.display()))
    })?;
    let path = dir.join(source.snapshot_file_name());
    fs::write(&path, contents).map_err(|e| {
        Error::execution(format!("could not write snapshot file '{}': {e}", path.display()))
    })?;
    info!("Saved {source} snapshot to '{}'", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sstatus-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_executable_is_execution_error() {
        let scontrol = Scontrol::Command("/nonexistent/scontrol".to_string());
        assert!(matches!(scontrol.show(Source::Node), Err(Error::Execution(_))));
    }

    #[test]
    fn failing_executable_is_execution_error() {
        let scontrol = Scontrol::Command("false".to_string());
        assert!(matches!(scontrol.show(Source::Partition), Err(Error::Execution(_))));
    }

    #[test]
    fn snapshot_roundtrip() {
        let dir = scratch_dir("snapshot");
        write_snapshot(&dir, Source::Node, "NodeName=c1 CPUTot=4\n").unwrap();

        let scontrol = Scontrol::Snapshot(dir.clone());
        assert_eq!(scontrol.show(Source::Node).unwrap(), "NodeName=c1 CPUTot=4\n");
        assert!(matches!(scontrol.show(Source::Partition), Err(Error::Execution(_))));

        fs::remove_dir_all(&dir).unwrap();
    }
}
