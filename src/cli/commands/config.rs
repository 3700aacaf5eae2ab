use anyhow::Result;
use std::path::PathBuf;

use crate::config::PortalConfig;

pub struct ConfigCommand {
    pub write: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn new(write: Option<PathBuf>) -> Self {
        Self { write }
    }

    pub fn execute(&self, config: &PortalConfig) -> Result<()> {
        if let Some(path) = &self.write {
            config.save_to_file(path)?;
            println!("✅ Configuration written to {}", path.display());
            return Ok(());
        }

        print!("{}", toml::to_string_pretty(&config.redacted())?);
        Ok(())
    }
}
