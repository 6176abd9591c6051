//! Unit tests for declaration validation and conversion.

use std::path::{Path, PathBuf};

use rstest::rstest;

use super::*;

const BASE: &str = "/srv/plugsmith";

fn parse<T: Declaration>(yaml: &str) -> T {
    serde_saphyr::from_str(yaml).expect("parse declaration")
}

fn fields(errors: &ValidationErrors) -> Vec<&str> {
    errors
        .issues()
        .iter()
        .map(|issue| issue.field.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Plugin sets
// ---------------------------------------------------------------------------

#[rstest]
#[case::ant("ant", BuilderKind::Ant, "plugins/src", "plugins/test/src")]
#[case::maven("maven", BuilderKind::Maven, "src/main/java", "src/test/java")]
fn plugin_set_defaults_follow_builder(
    #[case] builder: &str,
    #[case] kind: BuilderKind,
    #[case] main: &str,
    #[case] test: &str,
) {
    let declaration: PluginSetDeclaration = parse(&format!(
        "kind: PluginSet\nid: core\nname: Core plugins\nbuilder:\n  type: {builder}\n"
    ));

    let set = declaration.resolve(Path::new(BASE)).expect("valid set");

    assert_eq!(set.id(), "core");
    assert_eq!(set.kind(), kind);
    assert_eq!(set.root_path(), Path::new(BASE));
    assert_eq!(set.main_path(), Path::new(BASE).join(main));
    assert_eq!(set.test_path(), Path::new(BASE).join(test));
}

#[test]
fn plugin_set_overrides_resolve_against_root() {
    let declaration: PluginSetDeclaration = parse(
        "\
kind: PluginSet
id: core
name: Core
builder:
  type: maven
  main: java/main
  test: /abs/test
",
    );

    let set = declaration.resolve(Path::new(BASE)).expect("valid set");

    assert_eq!(set.main_path(), Path::new("/srv/plugsmith/java/main"));
    assert_eq!(set.test_path(), Path::new("/abs/test"));
}

#[test]
fn plugin_set_reports_every_problem() {
    let declaration: PluginSetDeclaration =
        parse("kind: PluginRegistry\nid: ''\nname: ' '\nbuilder:\n  type: gradle\n");

    let errors = declaration
        .resolve(Path::new(BASE))
        .expect_err("invalid set");

    assert_eq!(fields(&errors), ["kind", "id", "name", "builder.type"]);
    let message = errors.to_string();
    assert!(message.starts_with("4 problems"), "{message}");
    assert!(message.contains("expected one of: ant, maven"), "{message}");
}

#[test]
fn unknown_fields_fail_to_parse() {
    let result: Result<PluginSetDeclaration, _> = serde_saphyr::from_str(
        "kind: PluginSet\nid: core\nname: Core\nbuilder:\n  type: ant\n  mian: src\n",
    );
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Plugin registries
// ---------------------------------------------------------------------------

const REGISTRY: &str = "\
kind: PluginRegistry
id: main
name: Main registry
layout:
  type: rcs
  file-naming-convention: abbreviated
layers:
  - id: testing
    name: Testing
    path: testing
  - id: production
    name: Production
    path: /var/www/props
    file-naming-convention: identifier
plugin-identifiers:
  - org.example.Alpha
  - org.example.Beta
";

#[test]
fn registry_resolves_layers_and_naming() {
    let declaration: PluginRegistryDeclaration = parse(REGISTRY);

    let registry = declaration.resolve(Path::new(BASE)).expect("valid registry");

    assert_eq!(registry.id(), "main");
    assert_eq!(registry.layout(), RegistryLayout::Rcs);
    assert_eq!(registry.layer_ids().collect::<Vec<_>>(), ["testing", "production"]);
    let testing = registry.layer("testing").expect("testing layer");
    assert_eq!(testing.path(), Path::new("/srv/plugsmith/testing"));
    assert_eq!(testing.naming(), FileNamingConvention::Abbreviated);
    let production = registry.layer("production").expect("production layer");
    assert_eq!(production.path(), Path::new("/var/www/props"));
    assert_eq!(production.naming(), FileNamingConvention::Identifier);
    assert!(registry.has_plugin(&PluginId::new("org.example.Beta")));
    assert!(!registry.has_plugin(&PluginId::new("org.example.Gamma")));
}

#[test]
fn registry_naming_defaults_to_identifier() {
    let declaration: PluginRegistryDeclaration = parse(
        "\
kind: PluginRegistry
id: r
name: R
layout:
  type: directory
layers:
  - id: testing
    name: Testing
    path: t
plugin-identifiers: []
",
    );

    let registry = declaration.resolve(Path::new(BASE)).expect("valid registry");

    let layer = registry.layer("testing").expect("layer");
    assert_eq!(layer.naming(), FileNamingConvention::Identifier);
}

#[test]
fn registry_aggregates_layer_problems() {
    let declaration: PluginRegistryDeclaration = parse(
        "\
kind: PluginRegistry
id: r
name: R
layout:
  type: git
  file-naming-convention: short
layers:
  - id: testing
    name: Testing
    path: t
  - id: testing
    name: ''
    path: ''
    file-naming-convention: long
plugin-identifiers:
  - org.example.Alpha
  - org.example.Alpha
",
    );

    let errors = declaration
        .resolve(Path::new(BASE))
        .expect_err("invalid registry");

    assert_eq!(
        fields(&errors),
        [
            "layout.type",
            "layout.file-naming-convention",
            "layers[1].name",
            "layers[1].path",
            "layers[1].id",
            "layers[1].file-naming-convention",
            "plugin-identifiers[1]",
        ]
    );
}

#[test]
fn registry_requires_layers() {
    let declaration: PluginRegistryDeclaration = parse(
        "\
kind: PluginRegistry
id: r
name: R
layout:
  type: directory
layers: []
plugin-identifiers: []
",
    );

    let errors = declaration
        .resolve(Path::new(BASE))
        .expect_err("no layers");

    assert_eq!(fields(&errors), ["layers"]);
}

// ---------------------------------------------------------------------------
// Catalogs and credentials
// ---------------------------------------------------------------------------

#[test]
fn catalog_paths_resolve_against_base() {
    let declaration: PluginSetCatalogDeclaration =
        parse("kind: PluginSetCatalog\nplugin-set-files:\n  - sets/a.yaml\n  - /etc/b.yaml\n");

    let files = declaration.resolve(Path::new(BASE)).expect("valid catalog");

    assert_eq!(
        files,
        [
            PathBuf::from("/srv/plugsmith/sets/a.yaml"),
            PathBuf::from("/etc/b.yaml"),
        ]
    );
}

#[test]
fn empty_catalog_is_rejected() {
    let declaration: PluginRegistryCatalogDeclaration =
        parse("kind: PluginRegistryCatalog\nplugin-registry-files: []\n");

    let errors = declaration
        .resolve(Path::new(BASE))
        .expect_err("empty catalog");

    assert_eq!(fields(&errors), ["plugin-registry-files"]);
}

#[test]
fn credentials_resolve_keystore() {
    let declaration: PluginSigningCredentialsDeclaration = parse(
        "\
kind: PluginSigningCredentials
plugin-signing-keystore: keys/ks.jks
plugin-signing-alias: signer
",
    );

    let credentials = declaration.resolve(Path::new(BASE)).expect("valid credentials");

    assert_eq!(credentials.keystore(), Path::new("/srv/plugsmith/keys/ks.jks"));
    assert_eq!(credentials.alias(), "signer");
}
