//! Plugin build resolution and deployment fan-out.
//!
//! The `plugsmith-core` crate turns plugin identifiers into signed plugin
//! archives and copies those archives into deployment directories. Plugins
//! are declared by XML descriptors living in source trees; a descriptor names
//! its parent plugin and any auxiliary packages, and all of those source
//! directories must be handed to the packaging tool together.
//!
//! # Architecture
//!
//! - [`descriptor`] parses descriptors from source trees and from the
//!   manifest-flagged entry of a packaged archive.
//! - [`plugin_set`] resolves a plugin's ancestor chain and drives one of the
//!   supported builder toolchains to package and sign it.
//! - [`registry`] owns named deployment layers and copies archives into them,
//!   optionally under revision control.
//! - [`orchestrator`] routes identifiers to the first matching plugin set and
//!   archives to every matching registry layer.
//!
//! External programs run through the [`ToolRunner`] trait and operator
//! questions go through [`Confirm`], so the whole pipeline can be exercised
//! without spawning processes or reading a terminal. Signing passwords are
//! requested lazily through a [`PasswordProvider`] and are redacted from every
//! logged or reported command line.
//!
//! # Example
//!
//! ```rust,no_run
//! use plugsmith_core::{
//!     BuilderKind, Decline, NoPassword, Orchestrator, PluginId, PluginSet, Signing,
//!     SigningCredentials, SystemToolRunner,
//! };
//!
//! let set = PluginSet::new("core", "Core plugins", BuilderKind::Maven, "/srv/plugins");
//! let mut orchestrator = Orchestrator::new(vec![set], Vec::new(), SystemToolRunner, Decline);
//! let credentials = SigningCredentials::new("/srv/keys/plugins.jks", "release");
//! let signing = Signing::new(&credentials, &NoPassword);
//! let built = orchestrator
//!     .build(&[PluginId::new("org.example.MyPlugin")], &signing)
//!     .expect("build succeeds");
//! println!("{}", built[0].artifact.display());
//! ```

pub mod confirm;
pub mod credentials;
pub mod descriptor;
pub mod error;
pub mod orchestrator;
pub mod plugin_set;
pub mod process;
pub mod registry;

#[cfg(test)]
mod tests;

pub use self::confirm::{Confirm, Decline};
pub use self::credentials::{
    CachedPassword, NoPassword, PasswordProvider, Signing, SigningCredentials,
};
pub use self::descriptor::{PluginDescriptor, PluginId};
pub use self::error::{CredentialError, DescriptorError, PluginError, ToolError};
pub use self::orchestrator::{BuildResult, DeployReport, DeployResult, Orchestrator, ReleaseResult};
pub use self::plugin_set::{BuilderKind, BuiltArtifact, PluginSet};
pub use self::process::{SystemToolRunner, ToolInvocation, ToolRunner};
pub use self::registry::{
    FileNamingConvention, PluginRegistry, PluginRegistryLayer, RegistryLayout,
};
