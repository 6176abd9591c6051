//! Signing credentials and lazy password acquisition.
//!
//! The keystore path and alias are ordinary configuration. The password is
//! never stored in configuration: it is obtained through a
//! [`PasswordProvider`] that the build pipeline consults only when a signing
//! step actually runs, so operations that never sign never prompt.


use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;
use secrecy::{ExposeSecret, SecretString};

use crate::error::CredentialError;

/// Keystore location and key alias used to sign plugin archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningCredentials {
    keystore: PathBuf,
    alias: String,
}

impl SigningCredentials {
    /// Creates credentials for the given keystore and alias.
    #[must_use]
    pub fn new(keystore: impl Into<PathBuf>, alias: impl Into<String>) -> Self {
        Self {
            keystore: keystore.into(),
            alias: alias.into(),
        }
    }

    /// Returns the keystore path.
    #[must_use]
    pub fn keystore(&self) -> &Path {
        &self.keystore
    }

    /// Returns the key alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }
}

/// Zero-argument source of the signing password.
///
/// `Ok(None)` means no password is supplied and the signing tool is left to
/// obtain one itself.
pub trait PasswordProvider {
    /// Produces the password.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialError`] if the password cannot be obtained.
    fn password(&self) -> Result<Option<SecretString>, CredentialError>;
}

impl<F> PasswordProvider for F
where
    F: Fn() -> Result<Option<SecretString>, CredentialError>,
{
    fn password(&self) -> Result<Option<SecretString>, CredentialError> {
        self()
    }
}

/// Provider that never supplies a password.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPassword;

impl PasswordProvider for NoPassword {
    fn password(&self) -> Result<Option<SecretString>, CredentialError> {
        Ok(None)
    }
}

/// Memoizes another provider so it is consulted at most once.
///
/// Failures are not cached; a later call asks the inner provider again.
#[derive(Debug)]
pub struct CachedPassword<P> {
    inner: P,
    cached: OnceCell<Option<SecretString>>,
}

impl<P> CachedPassword<P> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: P) -> Self {
        Self {
            inner,
            cached: OnceCell::new(),
        }
    }

    /// Returns `true` once the inner provider has answered.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cached.get().is_some()
    }
}

impl<P: PasswordProvider> PasswordProvider for CachedPassword<P> {
    fn password(&self) -> Result<Option<SecretString>, CredentialError> {
        let cached = self.cached.get_or_try_init(|| self.inner.password())?;
        Ok(cached
            .as_ref()
            .map(|secret| SecretString::from(secret.expose_secret().to_owned())))
    }
}

/// Credentials plus password source handed to a build.
#[derive(Clone, Copy)]
pub struct Signing<'a> {
    credentials: &'a SigningCredentials,
    password: &'a dyn PasswordProvider,
}

impl<'a> Signing<'a> {
    /// Bundles credentials with a password source.
    #[must_use]
    pub fn new(credentials: &'a SigningCredentials, password: &'a dyn PasswordProvider) -> Self {
        Self {
            credentials,
            password,
        }
    }

    /// Returns the keystore path.
    #[must_use]
    pub fn keystore(&self) -> &Path {
        self.credentials.keystore()
    }

    /// Returns the key alias.
    #[must_use]
    pub fn alias(&self) -> &str {
        self.credentials.alias()
    }

    /// Asks the provider for the password.
    ///
    /// # Errors
    ///
    /// Propagates the provider's [`CredentialError`].
    pub fn password(&self) -> Result<Option<SecretString>, CredentialError> {
        self.password.password()
    }
}

impl std::fmt::Debug for Signing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signing")
            .field("credentials", self.credentials)
            .finish_non_exhaustive()
    }
}
