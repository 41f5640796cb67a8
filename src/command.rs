//! Plumbing for the external collaborator commands (mixer, sync, unmount,
//! bus power): argv templates from config with `{placeholder}` substitution,
//! run to completion with output discarded.

use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

/// Substitute `{name}` placeholders in one argument template.
pub fn render_arg(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        if out.contains(key) {
            out = out.replace(key, value);
        }
    }
    out
}

/// Failure modes of a collaborator command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started at all (typically: not installed).
    #[error("`{program}` could not be run: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The program ran and reported failure.
    #[error("`{program}` exited with {status}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
    },
}

impl CommandError {
    /// True when the program binary does not exist on this system.
    pub fn is_missing_program(&self) -> bool {
        matches!(
            self,
            CommandError::Unavailable { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Run `program` with the rendered `args` and wait for it to exit.
pub fn run(program: &str, args: &[String], vars: &[(&str, &str)]) -> Result<(), CommandError> {
    let rendered: Vec<String> = args.iter().map(|a| render_arg(a, vars)).collect();
    debug!(%program, args = ?rendered, "running collaborator command");

    let status = Command::new(program)
        .args(&rendered)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| CommandError::Unavailable {
            program: program.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandError::Failed {
            program: program.to_string(),
            status,
        })
    }
}
