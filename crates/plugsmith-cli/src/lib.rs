//! Command-line runtime for plugsmith.
//!
//! The runtime parses arguments, installs telemetry, loads the plugin set and
//! registry catalogs, and dispatches to the build, deploy, or release
//! handler. Results go to stdout as an aligned table or JSON; diagnostics and
//! logs go to stderr. Standard streams are injected so the runtime can be
//! exercised from tests.

use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod errors;
mod inputs;
mod password;
mod prompt;
mod render;
mod telemetry;

pub use cli::{OutputFormat, ResolvedOutputFormat};

use cli::{Cli, CliCommand};
use commands::CommandContext;
use errors::AppError;

/// Runs the CLI using the provided arguments and IO handles.
///
/// List files named `-` and confirmation answers are read from the process's
/// standard input.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let stdout_is_terminal = io::stdout().is_terminal();
    run_with_input(args, stdout, stderr, &mut io::stdin().lock(), stdout_is_terminal)
}

fn run_with_input<I, W, E, R>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    stdin: &mut R,
    stdout_is_terminal: bool,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    R: BufRead,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    match execute(cli, stdout, stdin, stdout_is_terminal) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write, R: BufRead>(
    cli: Cli,
    stdout: &mut W,
    stdin: &mut R,
    stdout_is_terminal: bool,
) -> Result<(), AppError> {
    telemetry::initialise(&cli.global.log_filter, cli.global.log_format)?;
    let context = CommandContext {
        global: &cli.global,
        stdout,
        stdin,
        format: cli.global.output.resolve(stdout_is_terminal),
    };
    match cli.command {
        CliCommand::Build(args) => commands::build(context, args),
        CliCommand::Deploy(args) => commands::deploy(context, args),
        CliCommand::Release(args) => commands::release(context, args),
    }
}
