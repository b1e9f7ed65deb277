use std::path::Path;

use anyhow::{Result, bail};
use colored::Colorize;
use itertools::Itertools;

use crate::cli::ConfigCmd;
use crate::types::{CONFIG_KEYS, Config, OutputFmt, emit, known_config_key, suggest_config_key};

fn check_key(key: &str) -> Result<&'static str> {
    if let Some(known) = known_config_key(key) {
        return Ok(known);
    }

    match suggest_config_key(key) {
        Some(s) => bail!("unknown config key `{key}` -- did you mean `{s}`?"),
        None => bail!(
            "unknown config key `{key}` (known keys: {})",
            CONFIG_KEYS.iter().map(|(k, _)| k).join(", ")
        ),
    }
}

pub fn handle(cmd: ConfigCmd, config_path: &Path, fmt: OutputFmt) -> Result<()> {
    let mut cfg = Config::load(config_path)?;

    match cmd {
        ConfigCmd::List => emit(fmt, &cfg.map, || {
            if cfg.map.is_empty() {
                println!("{}", "(no config set)".dimmed());
            } else {
                println!("{}", "Config:".cyan().bold());
                for (k, v) in &cfg.map {
                    println!("  {} = {}", k.green(), v);
                }
            }
            println!("\n{}", "Keys:".cyan().bold());
            for (k, desc) in CONFIG_KEYS {
                println!("  {:<14} {}", k, desc.dimmed());
            }
        })?,

        ConfigCmd::Get { key } => {
            check_key(&key)?;
            match cfg.get(&key) {
                Some(val) => println!("{val}"),
                None => println!("{} key `{}` not set", "warning:".yellow().bold(), key),
            }
        }

        ConfigCmd::Set { key, val } => {
            let key = check_key(&key)?;
            cfg.map.insert(key.to_string(), val.clone());
            cfg.save(config_path)?;
            println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), val);
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(config_path)?;
                println!("{} removed `{}`", "info:".blue().bold(), key.green());
            } else {
                println!("{} key `{}` not found", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
