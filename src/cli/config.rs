//
//  rested-api
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Gets, sets, and lists the scalar keys of the config file. Routes and the
//! base query/header maps are edited in the file directly.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{config_exists, Config, CONFIG_KEYS};
use crate::output::{truncate, TableBuilder};

use super::GlobalOptions;

/// Keys whose values are masked in listings.
const SECRET_KEYS: &[&str] = &["bootstrap.token"];

/// Manage configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value; empty to unset optional keys
    pub value: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global),
            ConfigSubcommand::Set(args) => self.set(args, global),
            ConfigSubcommand::List => self.list(global),
            ConfigSubcommand::Path => self.path(global),
        }
    }

    /// Get a configuration value
    fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        check_key(&args.key)?;
        let config = global.load_config()?;
        let value = config.get(&args.key);

        if global.json {
            let result = serde_json::json!({
                "key": args.key,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(v) = value {
            println!("{}", v);
        }

        Ok(())
    }

    /// Set a configuration value
    fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        check_key(&args.key)?;
        let mut config = global.load_config()?;
        config.set(&args.key, &args.value)?;
        let path = config.save(global.config.as_deref())?;

        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
                "value": config.get(&args.key),
                "path": path.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!(
                "{} Set {} = {}",
                style("✓").green(),
                style(&args.key).cyan(),
                args.value
            );
        }

        Ok(())
    }

    /// List all configuration values
    fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = global.load_config()?;

        if global.json {
            let mut values = serde_json::Map::new();
            for key in CONFIG_KEYS {
                values.insert(key.to_string(), serde_json::json!(config.get(key)));
            }
            let result = serde_json::json!({
                "values": values,
                "routes": config.routes.keys().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        let rows = CONFIG_KEYS.iter().map(|key| {
            let value = match config.get(key) {
                Some(_) if SECRET_KEYS.contains(key) => "(set)".to_string(),
                Some(v) => truncate(&v, 60),
                None => "-".to_string(),
            };
            vec![key.to_string(), value]
        });

        TableBuilder::new().headers(["Key", "Value"]).rows(rows).print();

        if !config.routes.is_empty() {
            println!();
            println!("{}", style("Routes").bold());
            for (name, route) in &config.routes {
                println!("  {} {}", style(name).cyan(), route.path);
            }
        }

        Ok(())
    }

    /// Show configuration file path
    fn path(&self, global: &GlobalOptions) -> Result<()> {
        let config_path = Config::resolve_path(global.config.as_deref())?;

        if global.json {
            let result = serde_json::json!({
                "path": config_path.display().to_string(),
                "exists": config_exists(&config_path),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", config_path.display());
        }

        Ok(())
    }
}

fn check_key(key: &str) -> Result<()> {
    if !CONFIG_KEYS.contains(&key) {
        bail!(
            "Unknown configuration key '{}'. Valid keys: {}",
            key,
            CONFIG_KEYS.join(", ")
        );
    }
    Ok(())
}
