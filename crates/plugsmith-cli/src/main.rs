//! CLI entrypoint for plugsmith.
//!
//! The binary delegates to [`plugsmith_cli::run`], which parses arguments,
//! loads the declared plugin sets and registries, and runs the requested
//! build, deploy, or release.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    plugsmith_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
