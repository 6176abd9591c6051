//! Signing password acquisition from the command line, the environment, or a
//! terminal prompt.

use std::sync::Arc;

use plugsmith_core::{CredentialError, PasswordProvider};
use secrecy::SecretString;

/// Environment variable consulted for the signing password.
pub(crate) const PASSWORD_ENV_VAR: &str = "PLUGSMITH_SIGNING_PASSWORD";

const PROMPT: &str = "Plugin signing password: ";

/// Resolves the signing password from `--password` (which clap fills from
/// [`PASSWORD_ENV_VAR`] when the option is absent), falling back to an
/// interactive terminal prompt via `rpassword`.
///
/// Wrap it in [`plugsmith_core::CachedPassword`] so the prompt appears at
/// most once per run, and only when a build actually signs something.
#[derive(Debug)]
pub(crate) struct SigningPassword {
    supplied: Option<SecretString>,
    interactive: bool,
}

impl SigningPassword {
    pub(crate) fn new(supplied: Option<String>, interactive: bool) -> Self {
        Self {
            supplied: supplied.map(SecretString::from),
            interactive,
        }
    }
}

impl PasswordProvider for SigningPassword {
    fn password(&self) -> Result<Option<SecretString>, CredentialError> {
        if let Some(secret) = &self.supplied {
            return Ok(Some(secret.clone()));
        }
        if !self.interactive {
            return Err(CredentialError::Unavailable {
                message: format!(
                    "no plugin signing password given in non-interactive mode; \
                     use --password or {PASSWORD_ENV_VAR}"
                ),
            });
        }
        rpassword::prompt_password(PROMPT)
            .map(|password| Some(SecretString::from(password)))
            .map_err(|source| CredentialError::Io {
                source: Arc::new(source),
            })
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn supplied_password_is_used_without_prompting() {
        let password = SigningPassword::new(Some(String::from("secret")), false)
            .password()
            .expect("password")
            .expect("some password");
        assert_eq!(password.expose_secret(), "secret");
    }

    #[test]
    fn non_interactive_without_password_is_unavailable() {
        let error = SigningPassword::new(None, false)
            .password()
            .expect_err("unavailable");
        assert!(
            matches!(
                &error,
                CredentialError::Unavailable { message } if message.contains(PASSWORD_ENV_VAR)
            ),
            "unexpected error: {error:?}"
        );
    }
}
