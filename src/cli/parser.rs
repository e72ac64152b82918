//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::build;
use crate::cache::Number;

/// Tag-aware key-value cache client
#[derive(Parser, Debug)]
#[command(name = "tagcache")]
#[command(about = "Tag-aware key-value cache client")]
#[command(long_about = "
Tagcache reads and writes typed, expiring entries in a memory or Redis
backend. Names are hashed into a per-domain namespace, and entries written
under a tag can be read, adjusted or deleted together.

Values are parsed as JSON when possible and stored as plain strings
otherwise. Results are printed as JSON on stdout; statistics and errors
recorded during the session are reported on stderr.

EXAMPLES:
    # Store a value for ten minutes
    tagcache set greeting '\"hello\"' --timeout 600

    # Store entries under a tag, then list and drop them
    tagcache set --tag news front '{\"title\": \"Today\"}'
    tagcache tag news members
    tagcache tag news delete

    # Counters
    tagcache set visits 0
    tagcache inc visits --by 5

    # Use another namespace and fail on the first error
    tagcache --domain example.com --strict get front
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load this TOML file instead of the layered `config/` directory.
    /// The file must exist and be readable.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Namespace domain
    ///
    /// Names are hashed together with this domain, so different domains never
    /// see each other's entries. A leading `www.` and letter case are ignored.
    #[arg(short, long, value_name = "DOMAIN", value_parser = super::validation::validate_domain)]
    pub domain: Option<String>,

    /// Fail on the first error instead of recording it
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging
    ///
    /// Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the values stored under NAMES
    Get {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Store VALUE under NAME, replacing what was there
    Set(WriteArgs),
    /// Store VALUE under NAME only if it holds nothing yet
    Add(WriteArgs),
    /// Check whether every name holds a live entry
    Have {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Delete NAMES
    Delete {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,

        /// Report whether every name existed beforehand
        #[arg(long)]
        checked: bool,
    },
    /// Add to numeric entries
    Inc(StepArgs),
    /// Subtract from numeric entries
    Dec(StepArgs),
    /// Multiply numeric entries
    Mult(FactorArgs),
    /// Divide numeric entries
    Div(FactorArgs),
    /// Remove every entry from the backend
    Flush,
    /// Operate on every entry recorded under TAGS
    ///
    /// Examples:
    ///   tagcache tag news members
    ///   tagcache tag news,sport inc --by 2
    ///   tagcache tag news delete
    Tag {
        /// Comma-separated tag names
        #[arg(value_name = "TAGS", value_delimiter = ',', required = true)]
        tags: Vec<String>,

        #[command(subcommand)]
        action: TagAction,
    },
}

/// Commands scoped to the selected tags
#[derive(Subcommand, Debug)]
pub enum TagAction {
    /// List the names recorded under the tags
    Members,
    /// Print every member's value
    Get,
    /// Overwrite every member
    Set(TagWriteArgs),
    /// Store under every member that holds nothing
    Add(TagWriteArgs),
    /// Delete every member and the tag indexes
    Delete,
    Inc(TagStepArgs),
    Dec(TagStepArgs),
    Mult(TagFactorArgs),
    Div(TagFactorArgs),
}

#[derive(Args, Debug)]
pub struct WriteArgs {
    pub name: String,

    /// JSON value, or a plain string if it does not parse
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    #[command(flatten)]
    pub timeout: TimeoutArg,

    /// Record the entry under these comma-separated tags
    #[arg(long = "tag", value_name = "TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,
}

#[derive(Args, Debug)]
pub struct StepArgs {
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    #[command(flatten)]
    pub step: TagStepArgs,
}

#[derive(Args, Debug)]
pub struct FactorArgs {
    #[arg(required = true, value_name = "NAME")]
    pub names: Vec<String>,

    #[command(flatten)]
    pub factor: TagFactorArgs,
}

#[derive(Args, Debug)]
pub struct TagWriteArgs {
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    #[command(flatten)]
    pub timeout: TimeoutArg,
}

#[derive(Args, Debug)]
pub struct TagStepArgs {
    /// Amount to apply
    #[arg(short, long, value_name = "AMOUNT", default_value = "1", allow_hyphen_values = true, value_parser = super::validation::validate_amount)]
    pub by: Number,

    #[command(flatten)]
    pub timeout: TimeoutArg,
}

#[derive(Args, Debug)]
pub struct TagFactorArgs {
    /// Factor or divisor to apply
    #[arg(short, long, value_name = "AMOUNT", allow_hyphen_values = true, value_parser = super::validation::validate_amount)]
    pub by: Number,

    #[command(flatten)]
    pub timeout: TimeoutArg,
}

#[derive(Args, Debug)]
pub struct TimeoutArg {
    /// Lifetime in seconds; the configured default when omitted
    #[arg(short, long, value_name = "SECONDS", value_parser = super::validation::validate_timeout)]
    pub timeout: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_flag() {
        let result = Cli::try_parse_from(["tagcache", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let result = Cli::try_parse_from(["tagcache", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["tagcache"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["tagcache", "--domain", "example.com", "--strict", "-v", "flush"]).unwrap();
        assert_eq!(cli.domain.as_deref(), Some("example.com"));
        assert!(cli.strict);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Flush));
    }

    #[test]
    fn test_set_command() {
        let cli = Cli::try_parse_from([
            "tagcache", "set", "--tag", "news,front", "greeting", "-42", "--timeout", "2.5",
        ])
        .unwrap();
        let Commands::Set(args) = cli.command else {
            panic!("Expected Set command");
        };
        assert_eq!(args.name, "greeting");
        assert_eq!(args.value, "-42");
        assert_eq!(args.timeout.timeout, Some(2.5));
        assert_eq!(args.tags, vec!["news", "front"]);
    }

    #[test]
    fn test_inc_defaults_to_one() {
        let cli = Cli::try_parse_from(["tagcache", "inc", "a", "b"]).unwrap();
        let Commands::Inc(args) = cli.command else {
            panic!("Expected Inc command");
        };
        assert_eq!(args.names, vec!["a", "b"]);
        assert_eq!(args.step.by, Number::Int(1));
        assert!(args.step.timeout.timeout.is_none());
    }

    #[test]
    fn test_div_requires_amount() {
        assert!(Cli::try_parse_from(["tagcache", "div", "a"]).is_err());
        let cli = Cli::try_parse_from(["tagcache", "div", "a", "--by", "0.5"]).unwrap();
        let Commands::Div(args) = cli.command else {
            panic!("Expected Div command");
        };
        assert_eq!(args.factor.by, Number::Float(0.5));
    }

    #[test]
    fn test_tag_command() {
        let cli = Cli::try_parse_from(["tagcache", "tag", "news,sport", "dec", "--by", "3"]).unwrap();
        let Commands::Tag { tags, action } = cli.command else {
            panic!("Expected Tag command");
        };
        assert_eq!(tags, vec!["news", "sport"]);
        assert!(matches!(action, TagAction::Dec(TagStepArgs { by: Number::Int(3), .. })));
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        let result = Cli::try_parse_from(["tagcache", "set", "a", "1", "--timeout", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let result = Cli::try_parse_from(["tagcache", "--verbose", "--quiet", "flush"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
