// SPDX-License-Identifier: MIT
// Copyright 2025. Triad National Security, LLC.

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::process::{Command, Output};

    fn fixtures() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    fn scratch_dir(test_id: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("sstatus-cli-{}-{test_id}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Run the sstatus binary. The default config path points nowhere so that a config file
    /// installed on the test machine cannot leak into the results.
    fn sstatus(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_sstatus"))
            .args(args)
            .env("SSTATUS_CONFIG", "/nonexistent/sstatus.toml")
            .env_remove("SSTATUS_LOG")
            .output()
            .unwrap()
    }

    fn sstatus_from_fixtures(args: &[&str]) -> Output {
        let dir = fixtures();
        let mut all = vec!["--from-snapshot", dir.to_str().unwrap()];
        all.extend_from_slice(args);
        sstatus(&all)
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn stderr(output: &Output) -> String {
        String::from_utf8_lossy(&output.stderr).into_owned()
    }

    #[test]
    fn default_is_load_csv() {
        let output = sstatus_from_fixtures(&[]);
        assert!(output.status.success(), "{}", stderr(&output));

        let out = stdout(&output);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("ratio,node,core,memory_gb,gpu"));
        assert_eq!(lines.next(), Some("allocated/pool,66.7%,25%,18.1%,50%"));
        assert_eq!(out.lines().count(), 7);
    }

    #[test]
    fn nodes_filtered_by_nodeset() {
        let output =
            sstatus_from_fixtures(&["-c", "nodes", "-n", "c[0001-0002]", "-n", "g0001"]);
        assert!(output.status.success(), "{}", stderr(&output));

        let names: Vec<String> = stdout(&output)
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["c0001", "c0002", "g0001"]);
    }

    #[test]
    fn partitions_mediawiki() {
        let output = sstatus_from_fixtures(&["-c", "partitions", "-f", "mediawiki"]);
        assert!(output.status.success(), "{}", stderr(&output));

        let out = stdout(&output);
        assert!(out.starts_with("{|class=\"wikitable\""));
        assert!(out.ends_with("|}\n"));
        assert_eq!(out.matches("|-").count(), 4);
    }

    #[test]
    fn summary_motd() {
        let output = sstatus_from_fixtures(&["-c", "nodes", "-s", "partitions", "-f", "motd"]);
        assert!(output.status.success(), "{}", stderr(&output));

        let out = stdout(&output);
        let struts = out.lines().nth(1).unwrap();
        assert!(struts.starts_with("| :-"), "{struts}");
        assert!(struts.ends_with("-: |"), "{struts}");
    }

    #[test]
    fn unknown_format_is_configuration_error() {
        let output = sstatus_from_fixtures(&["-f", "html"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stdout(&output).is_empty());
        assert!(stderr(&output).contains("configuration error"), "{}", stderr(&output));
    }

    #[test]
    fn summary_with_partitions_is_configuration_error() {
        let output = sstatus_from_fixtures(&["-c", "partitions", "-s", "all"]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("configuration error"));
    }

    #[test]
    fn missing_scontrol_is_execution_error() {
        let dir = scratch_dir("missing_scontrol");
        let config = dir.join("sstatus.toml");
        std::fs::write(&config, "scontrol = \"/nonexistent/scontrol\"\n").unwrap();

        let output = sstatus(&["--config", config.to_str().unwrap()]);
        assert_eq!(output.status.code(), Some(1));
        assert!(stdout(&output).is_empty());
        assert!(stderr(&output).contains("execution error"), "{}", stderr(&output));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn snapshot_save_and_replay() {
        let dir = scratch_dir("snapshot");
        let saved = dir.join("saved");

        // Stands in for scontrol: `--oneliner show <source>` prints the matching fixture.
        let script = dir.join("scontrol");
        std::fs::write(
            &script,
            format!("#!/bin/sh\ncat '{}'/\"$3\".txt\n", fixtures().display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let config = dir.join("sstatus.toml");
        std::fs::write(&config, format!("scontrol = '{}'\n", script.display())).unwrap();

        let live = sstatus(&[
            "--config",
            config.to_str().unwrap(),
            "-c",
            "nodes",
            "--save-snapshot",
            saved.to_str().unwrap(),
        ]);
        assert!(live.status.success(), "{}", stderr(&live));
        assert!(saved.join("node.txt").exists());

        let replay = sstatus(&["--from-snapshot", saved.to_str().unwrap(), "-c", "nodes"]);
        assert!(replay.status.success(), "{}", stderr(&replay));
        assert_eq!(stdout(&live), stdout(&replay));
        assert_eq!(stdout(&replay), stdout(&sstatus_from_fixtures(&["-c", "nodes"])));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
