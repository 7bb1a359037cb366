//! `sydia config` — Show the configuration.

use sydia_config::AppConfig;
use sydia_core::error::Error;

pub fn show(default: bool) -> Result<(), Box<dyn std::error::Error>> {
    if default {
        println!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = AppConfig::load().map_err(Error::from)?;
    println!("# {}", AppConfig::config_dir().join("config.toml").display());
    println!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}
