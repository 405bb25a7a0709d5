//! Synchronous execution of external tools.

use crate::{Error, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs an external executable to completion.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`, blocking until it exits.
    ///
    /// Returns an error if the program cannot be started or exits with a
    /// nonzero status.
    fn run(&self, program: &Path, args: &[String]) -> Result<()>;
}

/// Runs tools as child processes of the current process.
///
/// Standard output is discarded so the tool does not interleave with our own
/// console output; standard error is inherited so tool diagnostics stay
/// visible. There is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> Result<()> {
        let tool = tool_name(program);
        tracing::debug!("Running {} {}", program.display(), render_args(args));

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(program.display().to_string())
                } else {
                    Error::Io(e)
                }
            })?;

        if !status.success() {
            return Err(Error::tool_failed(tool, format!("exited with {status}")));
        }

        Ok(())
    }
}

/// Short name of a tool for error messages (`/opt/vgmstream/test.exe` → `test`).
pub fn tool_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}

/// Split a configured argument fragment into individual arguments.
///
/// Whitespace separates arguments. Text inside single or double quotes is
/// kept together with the quotes removed, so `-vf "scale=1280:-2, fps=30"`
/// yields two arguments.
pub fn split_args(fragment: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for c in fragment.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_arg {
        args.push(current);
    }

    args
}

/// Render arguments as a single line for logging, quoting those with spaces.
pub fn render_args(args: &[String]) -> String {
    args.iter()
        .map(|a| {
            if a.is_empty() || a.chars().any(char::is_whitespace) {
                format!("\"{a}\"")
            } else {
                a.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
