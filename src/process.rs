//! Subprocess invocation and scoped working-directory changes.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Builder for external commands with uniform failure reporting.
///
/// Steps run commands either captured (`run`, stderr folded into the
/// error) or interactive (`run_interactive`, stdio inherited so the
/// user sees configure/make output scroll by).
pub struct Cmd {
    program: String,
    args: Vec<String>,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            error_msg: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Headline used when the command fails, in place of the generic one.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    /// The command line as it would appear in a shell.
    pub fn describe(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Run with captured output; on failure stderr lands in the error.
    pub fn run(self) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("Failed to execute: {}", self.describe()))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(self.failure(format!(
            "Exit code: {:?}\n  stderr: {}",
            output.status.code(),
            stderr.trim()
        )))
    }

    /// Run with inherited stdio.
    pub fn run_interactive(self) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .with_context(|| format!("Failed to execute: {}", self.describe()))?;

        if status.success() {
            return Ok(());
        }

        Err(self.failure(format!("Exit code: {:?}", status.code())))
    }

    fn failure(&self, detail: String) -> anyhow::Error {
        match &self.error_msg {
            Some(msg) => anyhow!("{}\n  Command: {}\n  {}", msg, self.describe(), detail),
            None => anyhow!("Command failed: {}\n  {}", self.describe(), detail),
        }
    }
}

/// Scoped working-directory change.
///
/// Restores the previous directory on drop, on success and error paths
/// alike, so a failed build never leaves the process stranded inside
/// its own build tree.
pub struct Pushd {
    previous: PathBuf,
}

impl Pushd {
    /// Enter `dir`, which must already exist.
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir().context("Failed to resolve current directory")?;
        env::set_current_dir(dir)
            .with_context(|| format!("Failed to enter {}", dir.display()))?;
        Ok(Self { previous })
    }
}

impl Drop for Pushd {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            eprintln!(
                "  [WARN] Failed to restore working directory {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}
