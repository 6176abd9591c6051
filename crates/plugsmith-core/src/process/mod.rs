//! External tool invocation with credential redaction.
//!
//! Packaging, signing, and revision-control steps all shell out to external
//! programs. A [`ToolInvocation`] describes one such call; arguments that
//! carry secrets are kept apart from plain arguments so the rendered command
//! line used in logs and errors never contains them. The [`ToolRunner`] trait
//! is the seam between the build/deploy logic and the operating system;
//! [`SystemToolRunner`] is the production implementation.


use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::ToolError;

/// Placeholder substituted for secret values in rendered command lines.
pub const REDACTED: &str = "<password>";

const PROCESS_TARGET: &str = "plugsmith_core::process";

/// One argument of a tool invocation.
#[derive(Debug)]
pub enum ToolArg {
    /// An argument that may be shown verbatim.
    Plain(String),
    /// An argument whose value must never be shown. The prefix (for example
    /// `-Dkeystore.password=`) is kept visible.
    Secret {
        /// Visible prefix, possibly empty.
        prefix: String,
        /// Hidden value appended to the prefix when the tool is spawned.
        value: SecretString,
    },
}

impl ToolArg {
    fn redacted(&self) -> String {
        match self {
            Self::Plain(arg) => arg.clone(),
            Self::Secret { prefix, .. } => format!("{prefix}{REDACTED}"),
        }
    }

    fn exposed(&self) -> String {
        match self {
            Self::Plain(arg) => arg.clone(),
            Self::Secret { prefix, value } => format!("{prefix}{}", value.expose_secret()),
        }
    }
}

/// A program, its arguments, and the directory it runs in.
///
/// # Example
///
/// ```
/// use plugsmith_core::process::ToolInvocation;
/// use secrecy::SecretString;
///
/// let secret = SecretString::from(String::from("hunter2"));
/// let invocation = ToolInvocation::new("signplugin", "/src")
///     .args(["--jar", "My Plugin.jar"])
///     .secret_args("--password", &secret);
/// assert_eq!(
///     invocation.command_line(),
///     "signplugin --jar 'My Plugin.jar' --password '<password>'"
/// );
/// ```
#[derive(Debug)]
pub struct ToolInvocation {
    program: String,
    args: Vec<ToolArg>,
    cwd: PathBuf,
}

impl ToolInvocation {
    /// Starts an invocation of `program` running in `cwd`.
    #[must_use]
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    /// Appends a plain argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(ToolArg::Plain(arg.into()));
        self
    }

    /// Appends several plain arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|arg| ToolArg::Plain(arg.into())));
        self
    }

    /// Appends a plain flag followed by a secret value as its own argument.
    #[must_use]
    pub fn secret_args(self, flag: impl Into<String>, secret: &SecretString) -> Self {
        self.arg(flag).secret_arg("", secret)
    }

    /// Appends a single argument made of a visible prefix and a secret value.
    #[must_use]
    pub fn secret_arg(mut self, prefix: impl Into<String>, secret: &SecretString) -> Self {
        self.args.push(ToolArg::Secret {
            prefix: prefix.into(),
            value: SecretString::from(secret.expose_secret().to_owned()),
        });
        self
    }

    /// Returns the program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the working directory.
    #[must_use]
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Returns the arguments with secrets replaced by [`REDACTED`].
    #[must_use]
    pub fn redacted_args(&self) -> Vec<String> {
        self.args.iter().map(ToolArg::redacted).collect()
    }

    /// Returns the shell-quoted command line with secrets redacted.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.redacted_args())
            .map(|word| shell_quote(&word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns the arguments exactly as passed to the program.
    pub(crate) fn exposed_args(&self) -> Vec<String> {
        self.args.iter().map(ToolArg::exposed).collect()
    }
}

/// Quotes a word for display in a POSIX shell command line.
fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(c, '-' | '_' | '.' | '/' | ',' | ':' | '=' | '+' | '@' | '%')
        });
    if safe {
        word.to_owned()
    } else {
        format!("'{}'", word.replace('\'', r#"'"'"'"#))
    }
}

/// Trait abstracting external program execution for testability.
///
/// The production implementation is [`SystemToolRunner`]. Test code
/// implements this trait to record invocations and script their outcomes
/// without spawning processes.
pub trait ToolRunner {
    /// Runs the invocation to completion, blocking until it exits.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Spawn`] if the program cannot be started and
    /// [`ToolError::NonZeroExit`] if it reports failure. Both carry the
    /// redacted command line.
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError>;

    /// Runs the invocation quietly and reports whether it succeeded.
    ///
    /// Used for capability probes; failures to spawn count as `false`.
    fn probe(&self, invocation: &ToolInvocation) -> bool;

    /// Reads an environment variable visible to spawned tools.
    fn env_var(&self, key: &str) -> Option<OsString>;
}

/// Runs tools as child processes of the current process.
///
/// Standard output and standard error are inherited so operators see tool
/// progress as it happens. There is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolRunner;

impl SystemToolRunner {
    fn command(invocation: &ToolInvocation) -> Command {
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.exposed_args())
            .current_dir(invocation.cwd());
        command
    }
}

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        let command_line = invocation.command_line();
        debug!(
            target: PROCESS_TARGET,
            command = %command_line,
            cwd = %invocation.cwd().display(),
            "running external tool"
        );
        let status = Self::command(invocation)
            .status()
            .map_err(|source| ToolError::Spawn {
                command: command_line.clone(),
                source: Arc::new(source),
            })?;
        if status.success() {
            return Ok(());
        }
        Err(ToolError::NonZeroExit {
            command: command_line,
            status: status.code().unwrap_or(-1),
        })
    }

    fn probe(&self, invocation: &ToolInvocation) -> bool {
        let outcome = Self::command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        debug!(
            target: PROCESS_TARGET,
            command = %invocation.command_line(),
            ?outcome,
            "probed external tool"
        );
        outcome.is_ok_and(|status| status.success())
    }

    fn env_var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}
