use crate::config::AppConfig;
use crate::errors::AppResult;
use clap::Args;

/// Print the effective configuration as TOML
#[derive(Args)]
pub struct ShowConfigCommand {}

impl ShowConfigCommand {
    pub fn run(&self, config: &AppConfig) -> AppResult<()> {
        print!("{}", toml::to_string_pretty(config)?);
        Ok(())
    }
}
