//! `tara config`: validate and print the effective configuration.

use tara_config::{Config, ConfigLoader, ConfigValidator};

pub(crate) fn handle_config(config: &Config) -> anyhow::Result<()> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        eprintln!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        eprintln!("error: {}: {}", error.path, error.message);
    }
    let valid = result.is_valid();

    print!("{}", ConfigLoader::to_toml(config)?);
    if !valid {
        anyhow::bail!("configuration is invalid");
    }
    Ok(())
}
