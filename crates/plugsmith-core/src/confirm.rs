//! Operator confirmation before first-time deployment.

/// Asks the operator a yes/no question.
///
/// Implementations decide how the question is presented; the deploy logic
/// only consults this seam for interactive deployments that would create a
/// new destination file.
pub trait Confirm {
    /// Returns `true` if the operator agreed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the question cannot be asked or the answer
    /// cannot be read.
    fn confirm(&self, question: &str) -> std::io::Result<bool>;
}

/// Declines every question without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decline;

impl Confirm for Decline {
    fn confirm(&self, _question: &str) -> std::io::Result<bool> {
        Ok(false)
    }
}

/// Interprets a typed answer: only `y` (in any case) agrees, and an empty
/// answer takes the default of `n`.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
