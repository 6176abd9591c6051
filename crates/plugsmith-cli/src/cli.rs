//! CLI argument definitions for plugsmith.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use plugsmith_config::{DEFAULT_LOG_FILTER, LogFormat, default_log_format};

use crate::password::PASSWORD_ENV_VAR;

/// Layer selected by `--testing`.
const TESTING_LAYER: &str = "testing";
/// Layer selected by `--production`.
const PRODUCTION_LAYER: &str = "production";

/// Output format selection for command results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Selects `text` for terminal output and `json` for redirected output.
    #[default]
    Auto,
    /// Always render an aligned text table.
    Text,
    /// Always emit JSON.
    Json,
}

/// Output format after resolving `auto` based on TTY detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolvedOutputFormat {
    /// Aligned text table.
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Resolves the output format based on whether stdout is a terminal.
    #[must_use]
    pub const fn resolve(self, stdout_is_terminal: bool) -> ResolvedOutputFormat {
        match self {
            Self::Auto if stdout_is_terminal => ResolvedOutputFormat::Text,
            Self::Auto | Self::Json => ResolvedOutputFormat::Json,
            Self::Text => ResolvedOutputFormat::Text,
        }
    }
}

/// Builds signed plugin archives and deploys them into plugin registries.
#[derive(Parser, Debug)]
#[command(name = "plugsmith", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub(crate) struct GlobalArgs {
    /// Plugin set catalog to load instead of searching the default locations.
    #[arg(long, value_name = "FILE", global = true)]
    pub(crate) plugin_set_catalog: Option<PathBuf>,
    /// Plugin registry catalog to load instead of searching the default
    /// locations.
    #[arg(long, value_name = "FILE", global = true)]
    pub(crate) plugin_registry_catalog: Option<PathBuf>,
    /// Signing credentials to load instead of searching the default locations.
    #[arg(long, value_name = "FILE", global = true)]
    pub(crate) plugin_signing_credentials: Option<PathBuf>,
    /// Disallows interactive prompts.
    #[arg(long, short = 'n', global = true)]
    pub(crate) non_interactive: bool,
    /// Controls how results are rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto, global = true)]
    pub(crate) output: OutputFormat,
    /// Tracing filter directive, such as `debug` or `plugsmith_core=trace`.
    #[arg(long, value_name = "FILTER", default_value = DEFAULT_LOG_FILTER, global = true)]
    pub(crate) log_filter: String,
    /// Log line format written to stderr.
    #[arg(long, value_name = "FORMAT", default_value_t = default_log_format(), global = true)]
    pub(crate) log_format: LogFormat,
}

impl GlobalArgs {
    /// Returns `true` unless prompts were disabled.
    pub(crate) const fn interactive(&self) -> bool {
        !self.non_interactive
    }
}

/// Commands understood by plugsmith.
#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
    /// Builds and signs plugins.
    #[command(visible_aliases = ["build-plugin", "bp"])]
    Build(BuildArgs),
    /// Deploys plugin archives into registry layers.
    #[command(visible_aliases = ["deploy-plugin", "dp"])]
    Deploy(DeployArgs),
    /// Builds plugins, then deploys them into registry layers.
    #[command(visible_aliases = ["release-plugin", "rp"])]
    Release(ReleaseArgs),
}

/// Plugin identifiers named on the command line or in list files.
#[derive(Args, Debug)]
pub(crate) struct IdentifierArgs {
    /// Plugin identifiers.
    #[arg(value_name = "PLUGIN_ID")]
    pub(crate) identifiers: Vec<String>,
    /// File listing plugin identifiers, one per line; `-` reads stdin.
    #[arg(long, value_name = "FILE", visible_alias = "plugin-identifiers")]
    pub(crate) identifiers_file: Vec<PathBuf>,
}

/// Layers to deploy into.
#[derive(Args, Debug)]
pub(crate) struct LayerArgs {
    /// Layer identifier; may be repeated.
    #[arg(long = "layer", short = 'l', value_name = "LAYER")]
    pub(crate) layers: Vec<String>,
    /// Shorthand for `--layer testing`.
    #[arg(long, short = 't')]
    pub(crate) testing: bool,
    /// Shorthand for `--layer production`.
    #[arg(long, short = 'p')]
    pub(crate) production: bool,
}

impl LayerArgs {
    /// Requested layers in order, with shorthands appended and duplicates
    /// removed.
    pub(crate) fn layer_ids(&self) -> Vec<String> {
        let shorthands = [
            (self.testing, TESTING_LAYER),
            (self.production, PRODUCTION_LAYER),
        ];
        let mut layers: Vec<String> = Vec::new();
        let requested = self.layers.iter().map(String::as_str).chain(
            shorthands
                .into_iter()
                .filter_map(|(selected, layer)| selected.then_some(layer)),
        );
        for layer in requested {
            if !layers.iter().any(|known| known == layer) {
                layers.push(layer.to_owned());
            }
        }
        layers
    }
}

/// Signing password options.
#[derive(Args, Debug)]
pub(crate) struct PasswordArgs {
    /// Plugin signing password; prefer the environment variable or the
    /// interactive prompt.
    #[arg(long, value_name = "PASSWORD", env = PASSWORD_ENV_VAR, hide_env_values = true)]
    pub(crate) password: Option<String>,
}

/// Arguments of `plugsmith build`.
#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    #[command(flatten)]
    pub(crate) identifiers: IdentifierArgs,
    #[command(flatten)]
    pub(crate) password: PasswordArgs,
}

/// Arguments of `plugsmith deploy`.
#[derive(Args, Debug)]
pub(crate) struct DeployArgs {
    /// Plugin archives.
    #[arg(value_name = "JAR")]
    pub(crate) jars: Vec<PathBuf>,
    /// File listing plugin archives, one per line; `-` reads stdin.
    #[arg(long, value_name = "FILE", visible_alias = "plugin-jars")]
    pub(crate) jars_file: Vec<PathBuf>,
    #[command(flatten)]
    pub(crate) layers: LayerArgs,
}

/// Arguments of `plugsmith release`.
#[derive(Args, Debug)]
pub(crate) struct ReleaseArgs {
    #[command(flatten)]
    pub(crate) identifiers: IdentifierArgs,
    #[command(flatten)]
    pub(crate) layers: LayerArgs,
    #[command(flatten)]
    pub(crate) password: PasswordArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(OutputFormat::Auto, true, ResolvedOutputFormat::Text)]
    #[case(OutputFormat::Auto, false, ResolvedOutputFormat::Json)]
    #[case(OutputFormat::Text, false, ResolvedOutputFormat::Text)]
    #[case(OutputFormat::Json, true, ResolvedOutputFormat::Json)]
    fn output_format_resolution(
        #[case] format: OutputFormat,
        #[case] terminal: bool,
        #[case] expected: ResolvedOutputFormat,
    ) {
        assert_eq!(format.resolve(terminal), expected);
    }

    #[test]
    fn shorthand_layers_follow_explicit_ones_without_duplicates() {
        let cli = Cli::try_parse_from([
            "plugsmith", "deploy", "a.jar", "-p", "--layer", "staging", "--layer", "production",
            "-t",
        ])
        .expect("parse deploy");
        let CliCommand::Deploy(args) = cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };
        assert_eq!(args.layers.layer_ids(), ["staging", "production", "testing"]);
    }

    #[test]
    fn aliases_and_global_options_parse() {
        let cli = Cli::try_parse_from([
            "plugsmith",
            "bp",
            "org.example.A",
            "--plugin-identifiers",
            "ids.txt",
            "-n",
            "--log-format",
            "json",
        ])
        .expect("parse build");
        assert!(!cli.global.interactive());
        assert_eq!(cli.global.log_format, LogFormat::Json);
        let CliCommand::Build(args) = cli.command else {
            panic!("unexpected command: {:?}", cli.command);
        };
        assert_eq!(args.identifiers.identifiers, ["org.example.A"]);
        assert_eq!(args.identifiers.identifiers_file, [PathBuf::from("ids.txt")]);
    }

    #[rstest]
    #[case("build")]
    #[case("release")]
    fn password_falls_back_to_the_environment(#[case] name: &str) {
        let command = Cli::command();
        let subcommand = command.find_subcommand(name).expect("signing subcommand");
        let password = subcommand
            .get_arguments()
            .find(|argument| argument.get_id() == "password")
            .expect("password argument");

        assert_eq!(password.get_env(), Some(std::ffi::OsStr::new(PASSWORD_ENV_VAR)));
    }
}
