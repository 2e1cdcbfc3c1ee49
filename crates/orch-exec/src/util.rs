use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::trace;

use crate::{DockerCliConfig, CliError};

pub(crate) fn docker_command(cfg: &DockerCliConfig, subcommand: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(&cfg.binary);
    if let Some(host) = &cfg.host {
        cmd.arg("--host").arg(host);
    }
    cmd.arg(subcommand);
    cmd.args(args.iter().map(|s| s.as_str()));
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run one `docker` subcommand to completion; non-zero exit is an error carrying stderr.
pub(crate) async fn run(
    cfg: &DockerCliConfig,
    subcommand: &'static str,
    args: &[String],
) -> Result<Output, CliError> {
    trace!(target: "orch.exec.docker", binary = %cfg.binary, subcommand, ?args, "spawn");

    let output = docker_command(cfg, subcommand, args)
        .output()
        .await
        .map_err(|e| CliError::Spawn {
            binary: cfg.binary.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CliError::Failed {
            subcommand,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Last non-empty line of stdout, trimmed.
pub(crate) fn last_line(output: &Output) -> Option<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .map(str::to_string)
}
