//! CLI integration tests.
//!
//! Tests for argument parsing and how arguments feed the configuration.

use clap::Parser;
use index_doc::cli::args::{Args, Command, OutputFormat};
use index_doc::config::{CliOverrides, IndexDocConfig};
use std::io::Write;

fn parse(args: &[&str]) -> Result<Args, clap::Error> {
    Args::try_parse_from(std::iter::once("index-doc").chain(args.iter().copied()))
}

#[test]
fn test_default_command_is_check() {
    let args = parse(&[]).unwrap();
    assert_eq!(args.command, None);
    assert_eq!(args.command(), Command::Check);
}

#[test]
fn test_version_and_list_commands() {
    assert_eq!(parse(&["version"]).unwrap().command(), Command::Version);
    assert_eq!(parse(&["list"]).unwrap().command(), Command::List);
}

#[test]
fn test_options_after_command() {
    let args = parse(&["check", "--snapshot", "cluster.json", "--quiet"]).unwrap();
    assert_eq!(args.snapshot.as_deref(), Some(std::path::Path::new("cluster.json")));
    assert!(args.quiet);
}

#[test]
fn test_json_format() {
    let args = parse(&["--format", "json"]).unwrap();
    assert_eq!(args.format, Some(OutputFormat::Json));
}

#[test]
fn test_unknown_format_rejected() {
    assert!(parse(&["--format", "junit"]).is_err());
}

#[test]
fn test_unknown_option_rejected() {
    assert!(parse(&["--hardware"]).is_err());
}

#[test]
fn test_help_and_version_flags() {
    let err = parse(&["--help"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    let err = parse(&["--version"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}

#[test]
fn test_cli_overrides_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "host = \"http://from-file:9200\"\ntimeout_ms = 1000\nformat = \"json\"\nmax_retries = 4"
    )
    .unwrap();

    let args = parse(&[
        "--config",
        file.path().to_str().unwrap(),
        "--host",
        "http://from-cli:9200",
        "--format",
        "text",
        "--no-color",
    ])
    .unwrap();

    let mut config = IndexDocConfig::default();
    config.apply_cli_overrides(&args.overrides());
    assert_eq!(config.host, "http://from-cli:9200");

    let loaded = IndexDocConfig::from_toml(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
    assert_eq!(loaded.max_retries, 4);

    let mut layered = loaded.clone();
    layered.apply_cli_overrides(&args.overrides());
    assert_eq!(layered.host, "http://from-cli:9200");
    assert_eq!(layered.timeout_ms, 1000);
    assert_eq!(layered.format, OutputFormat::Text);
    assert_eq!(layered.max_retries, 4);
    assert!(!layered.color);
}

#[test]
fn test_empty_overrides_keep_config() {
    let config = IndexDocConfig::from_toml("host = \"http://es:9200\"").unwrap();
    let mut layered = config.clone();
    layered.apply_cli_overrides(&CliOverrides::default());
    assert_eq!(layered, config);
}
