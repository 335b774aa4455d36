//! Config subcommand implementation.
//!
//! Handles the `portsweep config` command: show the active settings, or
//! write a settings file holding the defaults.

use crate::config::{AppSettings, Paths};
use crate::error::{CliResult, ConfigError};
use crate::output;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Show or initialize the settings file.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Write a settings file with the default values
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing settings file
    #[arg(long, requires = "init")]
    pub force: bool,
}

impl ConfigCommand {
    /// Execute the config command against `path`, or the default location.
    pub fn execute(&self, path: Option<&Path>, quiet: bool) -> CliResult<()> {
        if self.init {
            let written = self.write_defaults(path)?;
            if !quiet {
                println!("Wrote default settings to {}", written.display());
            }
            return Ok(());
        }

        let file = settings_file(path)?;
        let settings = if file.exists() {
            AppSettings::load_from(&file)?
        } else {
            AppSettings::default()
        };
        output::print_settings(&file, &settings)?;
        Ok(())
    }

    fn write_defaults(&self, path: Option<&Path>) -> CliResult<PathBuf> {
        let file = settings_file(path)?;
        if file.exists() && !self.force {
            return Err(ConfigError::AlreadyExists(file).into());
        }

        let defaults = AppSettings::default();
        match path {
            Some(explicit) => defaults.save_to(explicit)?,
            None => defaults.save()?,
        }
        Ok(file)
    }
}

fn settings_file(path: Option<&Path>) -> CliResult<PathBuf> {
    match path {
        Some(explicit) => Ok(explicit.to_path_buf()),
        None => Ok(Paths::get()?.settings_file()),
    }
}
