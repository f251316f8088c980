//! Command implementations.

use crate::cli::{Command, DeriveArgs, ExportArgs};
use crate::error::{CliError, CliResult};
use std::fs;
use std::path::Path;
use themecraft_core::SceneDescription;
use themecraft_export::export_derived;
use themecraft_theme::{AcceptStatus, ComponentCatalog, DerivationSession, DerivedTheme, DesignConfiguration};

pub fn run(command: &Command) -> CliResult<()> {
    match command {
        Command::Derive(args) => run_derive(args),
        Command::Export(args) => run_export(args),
        Command::Catalog => {
            println!("{}", ComponentCatalog::standard().to_json()?);
            Ok(())
        }
    }
}

fn read(path: &Path) -> CliResult<String> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

fn write(path: &Path, contents: &str) -> CliResult<()> {
    fs::write(path, contents).map_err(|source| CliError::Write { path: path.to_path_buf(), source })
}

pub fn load_config(path: &Path) -> CliResult<DesignConfiguration> {
    let config = DesignConfiguration::from_json(&read(path)?)?;
    log::debug!("Loaded configuration '{}' from {}", config.name, path.display());
    Ok(config)
}

/// Run one derivation through a session, the same way an editor would.
pub fn derive(config: DesignConfiguration) -> CliResult<DerivedTheme> {
    let mut session = DerivationSession::new();
    let job = session.submit(config);
    let outcome = pollster::block_on(job.run_async());
    match session.accept(outcome) {
        AcceptStatus::Applied => session.active().cloned().ok_or(CliError::Superseded),
        AcceptStatus::Superseded => Err(CliError::Superseded),
        AcceptStatus::Rejected(err) => Err(err.into()),
    }
}

pub fn run_derive(args: &DeriveArgs) -> CliResult<()> {
    let theme = derive(load_config(&args.config)?)?;
    let json = theme.tokens.to_json()?;
    match &args.output {
        Some(path) => {
            write(path, &json)?;
            log::info!("Wrote {} tokens to {}", theme.tokens.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn run_export(args: &ExportArgs) -> CliResult<()> {
    let config = load_config(&args.config)?;
    let scene = match &args.scene {
        Some(path) => SceneDescription::from_json(&read(path)?)?,
        None => SceneDescription::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => ComponentCatalog::from_json(&read(path)?)?,
        None => ComponentCatalog::standard(),
    };
    let name = config.name.clone();
    let theme = derive(config)?;
    let bundle = export_derived(&name, &theme, &catalog, &scene)?;

    for warning in bundle.report().warnings() {
        log::warn!("{warning}");
    }
    if args.zip {
        bundle.write_zip(&args.output)?;
    } else {
        bundle.write_to_dir(&args.output)?;
    }
    Ok(())
}
