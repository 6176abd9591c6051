//! Operator confirmation on the controlling terminal.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};

use plugsmith_core::Confirm;
use plugsmith_core::confirm::is_affirmative;

/// Writes the question to stderr and reads one answer line from the session
/// input.
///
/// The input is the reader the whole command runs with, so answers and list
/// files named `-` share one stream: lines consumed by a list are never seen
/// as answers. End of input counts as the default answer, which declines.
pub(crate) struct TerminalConfirm<'a, R> {
    input: RefCell<&'a mut R>,
}

impl<'a, R: BufRead> TerminalConfirm<'a, R> {
    pub(crate) const fn new(input: &'a mut R) -> Self {
        Self {
            input: RefCell::new(input),
        }
    }
}

impl<R: BufRead> Confirm for TerminalConfirm<'_, R> {
    fn confirm(&self, question: &str) -> io::Result<bool> {
        let mut input = self.input.borrow_mut();
        ask(question, &mut io::stderr().lock(), &mut **input)
    }
}

fn ask<W: Write, R: BufRead>(question: &str, output: &mut W, input: &mut R) -> io::Result<bool> {
    output.write_all(question.as_bytes())?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}
