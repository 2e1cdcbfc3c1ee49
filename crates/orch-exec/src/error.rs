use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("spawn {binary}: {reason}")]
    Spawn { binary: String, reason: String },
    #[error("docker {subcommand} failed (exit code {code:?}): {stderr}")]
    Failed {
        subcommand: &'static str,
        code: Option<i32>,
        stderr: String,
    },
    #[error("unexpected docker {subcommand} output: {output:?}")]
    UnexpectedOutput {
        subcommand: &'static str,
        output: String,
    },
}

impl CliError {
    /// The daemon reported that the container does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CliError::Failed { stderr, .. } if stderr.contains("No such container"))
    }
}
