use clap::Parser;
use std::fs;
use themecraft_cli::commands::run;
use themecraft_cli::{Cli, CliError};
use themecraft_theme::{DesignConfiguration, TokenSet};

fn write_config(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("config.json");
    let mut config = DesignConfiguration::new("#006a6a");
    config.name = "Teal".to_string();
    fs::write(&path, config.to_json().unwrap()).unwrap();
    path
}

#[test]
fn derive_writes_token_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let output = dir.path().join("tokens.json");
    let cli = Cli::parse_from([
        "themecraft",
        "derive",
        "--config",
        config.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ]);
    run(&cli.command).unwrap();
    let tokens = TokenSet::from_json(&fs::read_to_string(output).unwrap()).unwrap();
    assert!(tokens.contains("color-primary"));
    assert!(tokens.contains("spacing-md"));
}

#[test]
fn export_writes_directory_and_zip() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let out_dir = dir.path().join("bundle");
    let cli = Cli::parse_from([
        "themecraft",
        "export",
        "--config",
        config.to_str().unwrap(),
        "--output",
        out_dir.to_str().unwrap(),
    ]);
    run(&cli.command).unwrap();
    assert!(out_dir.join("theme.css").exists());
    assert!(out_dir.join("README.md").exists());

    let archive = dir.path().join("teal.zip");
    let cli = Cli::parse_from([
        "themecraft",
        "export",
        "--config",
        config.to_str().unwrap(),
        "--output",
        archive.to_str().unwrap(),
        "--zip",
        "--verbose",
    ]);
    assert!(cli.verbose);
    run(&cli.command).unwrap();
    assert!(fs::metadata(&archive).unwrap().len() > 0);
}

#[test]
fn missing_config_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let cli = Cli::parse_from(["themecraft", "derive", "--config", missing.to_str().unwrap()]);
    assert!(matches!(run(&cli.command), Err(CliError::Read { .. })));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r##"{"colors": {"primary": "#zzzzzz"}}"##).unwrap();
    let cli = Cli::parse_from(["themecraft", "derive", "--config", path.to_str().unwrap()]);
    assert!(matches!(run(&cli.command), Err(CliError::Theme(_))));
}
