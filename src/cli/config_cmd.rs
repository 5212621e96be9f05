//! Config subcommands: init, show, diff.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::{
    self, diff, global_config_path, load_global, load_local, load_merged, Config, PartialConfig,
    LOCAL_CONFIG_FILE,
};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize a configuration file with default settings
    Init {
        /// Create the config file in the current directory
        #[arg(long)]
        local: bool,
        /// Create a minimal config that only overrides specific settings
        #[arg(long)]
        minimal: bool,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Display the current configuration
    Show {
        /// Show the effective configuration after merging global and local
        #[arg(long)]
        merged: bool,
    },
    /// Show differences between global and local configuration
    Diff,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init { local, minimal, force } => init(local, minimal, force),
        ConfigCommands::Show { merged } => show(merged),
        ConfigCommands::Diff => run_diff(),
    }
}

fn init(local: bool, minimal: bool, force: bool) -> Result<()> {
    let path: PathBuf =
        if local { PathBuf::from(LOCAL_CONFIG_FILE) } else { global_config_path() };

    if path.exists() && !force {
        bail!("config file already exists at {} (use --force to overwrite)", path.display());
    }

    if minimal && local {
        // Empty overlay: every setting stays inherited until overridden.
        let partial = PartialConfig::default();
        let data = serde_yaml::to_string(&partial)?;
        std::fs::write(&path, data)?;
    } else {
        config::loader::save(&Config::default(), &path)?;
    }

    println!("Configuration initialized at {}", path.display());
    Ok(())
}

fn show(merged: bool) -> Result<()> {
    let config = if merged { load_merged()? } else { load_global()? };
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}

fn run_diff() -> Result<()> {
    let global = load_global()?;
    let Some(local) = load_local()? else {
        println!("No local configuration found");
        return Ok(());
    };

    let d = diff(&global, &local);
    if d.is_empty() {
        println!("No differences found between global and local configuration");
    } else {
        println!("Configuration differences (local vs global):");
        print!("{d}");
    }
    Ok(())
}
