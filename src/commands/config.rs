use crate::core::{Config, Repository};
use anyhow::{bail, Context};
use clap::Subcommand;
use colored::*;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a key to the repository config, or the global one with --global
    Set {
        key: String,
        value: String,
        #[arg(long)]
        global: bool,
    },
    Get {
        key: String,
    },
    List,
}

const KNOWN_KEYS: [&str; 2] = ["init.defaultBranch", "color.ui"];

pub fn run(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Set { key, value, global } => set_config(&key, &value, global),
        ConfigAction::Get { key } => get_config(&key),
        ConfigAction::List => list_config(),
    }
}

fn validate(key: &str, value: &str) -> anyhow::Result<()> {
    if !KNOWN_KEYS.contains(&key) {
        bail!("Invalid configuration key: {}", key);
    }
    match key {
        "color.ui" if !matches!(value, "true" | "false") => {
            bail!("color.ui must be 'true' or 'false'")
        }
        "init.defaultBranch" if value.trim().is_empty() || value.contains(char::is_whitespace) => {
            bail!("Invalid branch name: '{}'", value)
        }
        _ => Ok(()),
    }
}

/// Effective configuration: repository values when inside one, else global.
fn load_effective() -> anyhow::Result<Config> {
    match Repository::open(".") {
        Ok(repo) => Ok(repo.config()?),
        Err(_) => Ok(Config::load_global()?),
    }
}

fn set_config(key: &str, value: &str, global: bool) -> anyhow::Result<()> {
    validate(key, value)?;

    if global {
        let mut config = Config::load_global()?;
        config.set(key, value);
        config.save_global()?;
    } else {
        let repo = Repository::open(".").context("use --global outside a repository")?;
        let mut config = Config::load_repo(&repo.git_dir)?;
        config.set(key, value);
        config.save_repo(&repo.git_dir)?;
    }

    let scope = if global { "global" } else { "local" };
    println!("{} {} = {} {}", "Set".green(), key.bright_cyan(), value, format!("({})", scope).bright_black());
    Ok(())
}

fn get_config(key: &str) -> anyhow::Result<()> {
    let config = load_effective()?;
    match config.get(key) {
        Some(value) => println!("{}", value),
        None => bail!("Configuration key '{}' not set", key),
    }
    Ok(())
}

fn list_config() -> anyhow::Result<()> {
    let config = load_effective()?;
    if config.is_empty() {
        println!("{}", "No configuration set".bright_black());
        return Ok(());
    }
    for (key, value) in config.iter() {
        println!("{}={}", key.bright_cyan(), value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Args {
        #[command(subcommand)]
        action: ConfigAction,
    }

    #[test]
    fn parses_set_with_global_flag() {
        let args = Args::try_parse_from(["config", "set", "color.ui", "false", "--global"]).unwrap();
        assert!(matches!(
            args.action,
            ConfigAction::Set { ref key, ref value, global: true } if key == "color.ui" && value == "false"
        ));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(validate("user.name", "x").is_err());
        assert!(validate("color.ui", "sometimes").is_err());
        assert!(validate("init.defaultBranch", "two words").is_err());
        assert!(validate("init.defaultBranch", "trunk").is_ok());
    }
}
