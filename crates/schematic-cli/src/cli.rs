//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.
//!
//! Copyright (c) 2025 Schematic Team
//! Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Schematic CLI - validate and coerce documents against JSON-Schema style schemas
///
/// Schemas are looked up by URI in a schema directory (or given as a file
/// path), checked against their metaschema and compiled once per run.
#[derive(Parser, Debug)]
#[command(
    name = "schematic",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SCHEMATIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate documents against a schema
    Validate(ValidateArgs),

    /// Apply the type coercions found by validation and write the corrected document
    Coerce(CoerceArgs),

    /// Inspect the schemas available to the other commands
    Schemas(SchemasArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Where schemas come from
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SchemaSource {
    /// Directory of schema files (JSON or YAML) to load, overriding the configured one
    #[arg(long, value_name = "DIR", env = "SCHEMATIC_SCHEMAS_DIR")]
    pub schemas_dir: Option<PathBuf>,

    /// Skip checking schemas against their metaschema
    #[arg(long)]
    pub no_metaschema: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Documents to validate (JSON or YAML)
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,

    /// Schema URI, or path to a schema file
    #[arg(short, long, value_name = "SCHEMA")]
    pub schema: String,

    #[command(flatten)]
    pub source: SchemaSource,

    /// Judge validity after applying type coercions
    #[arg(long)]
    pub coerce: bool,

    /// Save the validation report to a file
    #[arg(long = "save-to", value_name = "REPORT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the coerce command
#[derive(Parser, Debug)]
pub struct CoerceArgs {
    /// Document to correct (JSON or YAML)
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Schema URI, or path to a schema file
    #[arg(short, long, value_name = "SCHEMA")]
    pub schema: String,

    #[command(flatten)]
    pub source: SchemaSource,

    /// Write the corrected document to a file (stdout if not specified)
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the schemas command
#[derive(Parser, Debug)]
pub struct SchemasArgs {
    #[command(subcommand)]
    pub action: SchemasAction,
}

/// Schema inspection actions
#[derive(Subcommand, Debug)]
pub enum SchemasAction {
    /// List the URIs of every known schema
    List(SchemaSource),

    /// Load and compile one schema and report its problems
    Check(SchemasCheckArgs),
}

/// Arguments for schemas check
#[derive(Parser, Debug)]
pub struct SchemasCheckArgs {
    /// Schema URI, or path to a schema file
    #[arg(value_name = "SCHEMA")]
    pub schema: String,

    #[command(flatten)]
    pub source: SchemaSource,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (user config directory if not specified)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
