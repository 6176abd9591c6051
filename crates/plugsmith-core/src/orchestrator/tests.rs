//! Unit tests for routing builds and deployments.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use secrecy::SecretString;
use tempfile::TempDir;

use super::*;
use crate::confirm::Decline;
use crate::credentials::{CachedPassword, NoPassword, SigningCredentials};
use crate::error::CredentialError;
use crate::plugin_set::BuilderKind;
use crate::registry::{FileNamingConvention, RegistryLayout};
use crate::tests::{DescriptorFixture, MockPrompt, RecordingRunner};

const ALPHA: &str = "org.example.Alpha";
const BETA: &str = "org.example.Beta";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Maven plugin set under `name` whose sources declare `ids`.
    fn maven_set(&self, name: &str, ids: &[&str]) -> PluginSet {
        let set = PluginSet::new(name, name, BuilderKind::Maven, self.path(name));
        for id in ids {
            DescriptorFixture::new(id, 1).write_source(set.main_path());
        }
        set
    }

    /// Archive for `id` outside any plugin set.
    fn jar(&self, id: &str, version: u32) -> PathBuf {
        let path = self.path(&format!("jars/{id}.jar"));
        DescriptorFixture::new(id, version).write_jar(&path);
        path
    }

    fn layer_dir(&self, registry: &str, layer: &str) -> PathBuf {
        let path = self.path(&format!("{registry}/{layer}"));
        std::fs::create_dir_all(&path).expect("create layer");
        path
    }

    fn registry(&self, id: &str, plugins: &[&str], layers: &[&str]) -> PluginRegistry {
        layers.iter().fold(
            PluginRegistry::new(
                id,
                id,
                RegistryLayout::Directory,
                plugins.iter().copied().map(PluginId::new),
            ),
            |registry, layer| {
                registry.with_layer(
                    *layer,
                    *layer,
                    self.layer_dir(id, layer),
                    FileNamingConvention::Identifier,
                )
            },
        )
    }
}

#[fixture]
fn fixture() -> Fixture {
    Fixture {
        dir: TempDir::new().expect("temp dir"),
    }
}

/// Runner whose `mvn` writes an archive for every given plugin into the
/// project it runs in.
fn maven_runner(ids: &'static [&'static str]) -> RecordingRunner {
    RecordingRunner::default().on_run("mvn", move |invocation| {
        for id in ids {
            let jar = invocation
                .cwd()
                .join("target/pluginjars")
                .join(format!("{id}.jar"));
            DescriptorFixture::new(id, 2).write_jar(&jar);
        }
    })
}

fn credentials() -> SigningCredentials {
    SigningCredentials::new("/keys/ks.jks", "alias")
}

fn ids(ids: &[&str]) -> Vec<PluginId> {
    ids.iter().copied().map(PluginId::new).collect()
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[rstest]
fn first_matching_set_builds(fixture: Fixture) {
    let first = fixture.maven_set("first", &[ALPHA]);
    let second = fixture.maven_set("second", &[ALPHA, BETA]);
    let mut orchestrator = Orchestrator::new(
        vec![first, second],
        Vec::new(),
        maven_runner(&[ALPHA, BETA]),
        Decline,
    );
    let creds = credentials();

    let results = orchestrator
        .build(&ids(&[BETA, ALPHA]), &Signing::new(&creds, &NoPassword))
        .expect("build");

    let sets: Vec<(&str, &str)> = results
        .iter()
        .map(|result| (result.plugin_id.as_str(), result.set_id.as_str()))
        .collect();
    assert_eq!(sets, [(BETA, "second"), (ALPHA, "first")]);
    assert!(orchestrator.plugin_sets().iter().all(PluginSet::is_built));
    assert_eq!(orchestrator.runner().programs(), ["mvn", "mvn"]);
}

#[rstest]
fn unknown_identifier_is_not_found_even_if_archive_exists(fixture: Fixture) {
    let set = fixture.maven_set("only", &[ALPHA]);
    DescriptorFixture::new(BETA, 1)
        .write_jar(&fixture.path("only/target/pluginjars/org.example.Beta.jar"));
    let mut orchestrator =
        Orchestrator::new(vec![set], Vec::new(), maven_runner(&[ALPHA]), Decline);
    let creds = credentials();

    let error = orchestrator
        .build(&ids(&[BETA]), &Signing::new(&creds, &NoPassword))
        .expect_err("not found");

    assert!(
        matches!(&error, PluginError::NotFound { plugin_id } if plugin_id.as_str() == BETA),
        "unexpected error: {error:?}"
    );
    assert!(orchestrator.runner().calls().is_empty());
}

#[rstest]
fn first_failure_aborts_the_batch(fixture: Fixture) {
    let set = fixture.maven_set("only", &[ALPHA]);
    let mut orchestrator =
        Orchestrator::new(vec![set], Vec::new(), maven_runner(&[ALPHA]), Decline);
    let creds = credentials();

    let error = orchestrator
        .build(&ids(&["org.example.Missing", ALPHA]), &Signing::new(&creds, &NoPassword))
        .expect_err("abort");

    assert!(matches!(error, PluginError::NotFound { .. }), "unexpected error: {error:?}");
    assert!(orchestrator.runner().calls().is_empty());
}

// ---------------------------------------------------------------------------
// Deploy
// ---------------------------------------------------------------------------

#[rstest]
fn undefined_layers_are_skipped(fixture: Fixture) {
    let registry = fixture.registry("reg", &[ALPHA], &["testing", "production"]);
    let orchestrator =
        Orchestrator::new(Vec::new(), vec![registry], RecordingRunner::default(), Decline);
    let jar = fixture.jar(ALPHA, 4);

    let reports = orchestrator
        .deploy(&[jar.clone()], &["production", "staging"], false)
        .expect("deploy");

    let [report] = reports.as_slice() else {
        panic!("unexpected reports: {reports:?}");
    };
    assert_eq!(report.artifact, jar);
    assert_eq!(report.plugin_id.as_str(), ALPHA);
    let [deployment] = report.deployments.as_slice() else {
        panic!("unexpected deployments: {:?}", report.deployments);
    };
    assert_eq!(deployment.registry_id, "reg");
    assert_eq!(deployment.layer_id, "production");
    assert_eq!(
        deployment.path.as_deref(),
        Some(fixture.path("reg/production/org.example.Alpha.jar").as_path())
    );
    assert_eq!(deployment.descriptor.version(), 4);
    assert!(!fixture.path("reg/testing/org.example.Alpha.jar").exists());
}

#[rstest]
fn registries_in_load_order_then_layers_in_request_order(fixture: Fixture) {
    let first = fixture.registry("first", &[ALPHA], &["testing", "production"]);
    let other = fixture.registry("other", &[BETA], &["testing"]);
    let second = fixture.registry("second", &[ALPHA], &["production", "testing"]);
    let orchestrator = Orchestrator::new(
        Vec::new(),
        vec![first, other, second],
        RecordingRunner::default(),
        Decline,
    );

    let reports = orchestrator
        .deploy(&[fixture.jar(ALPHA, 1)], &["production", "testing"], false)
        .expect("deploy");

    let visited: Vec<(&str, &str)> = reports
        .iter()
        .flat_map(|report| &report.deployments)
        .map(|deployment| (deployment.registry_id.as_str(), deployment.layer_id.as_str()))
        .collect();
    assert_eq!(
        visited,
        [
            ("first", "production"),
            ("first", "testing"),
            ("second", "production"),
            ("second", "testing"),
        ]
    );
}

#[rstest]
fn undeclared_identifier_is_an_error(fixture: Fixture) {
    let registry = fixture.registry("reg", &[ALPHA], &["testing"]);
    let orchestrator =
        Orchestrator::new(Vec::new(), vec![registry], RecordingRunner::default(), Decline);
    let jar = fixture.jar(BETA, 1);

    let error = orchestrator
        .deploy(&[jar.clone()], &["testing"], false)
        .expect_err("undeclared");

    assert!(
        matches!(&error, PluginError::Undeclared { artifact, plugin_id }
            if artifact == &jar && plugin_id.as_str() == BETA),
        "unexpected error: {error:?}"
    );
}

#[rstest]
fn declared_without_requested_layers_deploys_nothing(fixture: Fixture) {
    let registry = fixture.registry("reg", &[ALPHA], &["testing"]);
    let orchestrator =
        Orchestrator::new(Vec::new(), vec![registry], RecordingRunner::default(), Decline);

    let reports = orchestrator
        .deploy(&[fixture.jar(ALPHA, 1)], &["production"], false)
        .expect("deploy");

    assert!(reports.iter().all(|report| report.deployments.is_empty()));
}

#[rstest]
fn unreadable_archive_aborts_before_any_copy(fixture: Fixture) {
    let registry = fixture.registry("reg", &[ALPHA], &["testing"]);
    let orchestrator =
        Orchestrator::new(Vec::new(), vec![registry], RecordingRunner::default(), Decline);
    let broken = fixture.path("broken.jar");
    std::fs::write(&broken, b"junk").expect("write");

    let error = orchestrator
        .deploy(&[fixture.jar(ALPHA, 1), broken], &["testing"], false)
        .expect_err("broken archive");

    assert!(matches!(error, PluginError::Descriptor(_)), "unexpected error: {error:?}");
    assert!(!fixture.path("reg/testing/org.example.Alpha.jar").exists());
}

#[rstest]
fn declined_deployment_is_recorded_without_path(fixture: Fixture) {
    let registry = fixture.registry("reg", &[ALPHA], &["testing"]);
    let mut prompt = MockPrompt::new();
    prompt.expect_confirm().times(1).returning(|_| Ok(false));
    let orchestrator =
        Orchestrator::new(Vec::new(), vec![registry], RecordingRunner::default(), prompt);

    let reports = orchestrator
        .deploy(&[fixture.jar(ALPHA, 1)], &["testing"], true)
        .expect("deploy");

    let paths: Vec<Option<&Path>> = reports
        .iter()
        .flat_map(|report| &report.deployments)
        .map(|deployment| deployment.path.as_deref())
        .collect();
    assert_eq!(paths, [None]);
}

// ---------------------------------------------------------------------------
// Release
// ---------------------------------------------------------------------------

#[rstest]
fn release_rekeys_by_identifier_and_asks_for_password_once(fixture: Fixture) {
    let set = fixture.maven_set("project", &[ALPHA, BETA]);
    let registry = fixture.registry("reg", &[ALPHA, BETA], &["production"]);
    let mut orchestrator = Orchestrator::new(
        vec![set],
        vec![registry],
        maven_runner(&[ALPHA, BETA]),
        Decline,
    );
    let creds = credentials();
    let asked = Cell::new(0_u32);
    let prompt = || -> Result<Option<SecretString>, CredentialError> {
        asked.set(asked.get() + 1);
        Ok(Some(SecretString::from(String::from("pw"))))
    };
    let password = CachedPassword::new(prompt);

    let results = orchestrator
        .release(&ids(&[ALPHA, BETA]), &["production"], false, &Signing::new(&creds, &password))
        .expect("release");

    let released: Vec<(&str, usize)> = results
        .iter()
        .map(|result| (result.plugin_id.as_str(), result.deployments.len()))
        .collect();
    assert_eq!(released, [(ALPHA, 1), (BETA, 1)]);
    assert_eq!(asked.get(), 1);
    assert!(fixture.path("reg/production/org.example.Beta.jar").is_file());
}
