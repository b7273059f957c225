use clap::Subcommand;
use std::path::PathBuf;

use enrollbot_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the parsed effective configuration (password redacted)
    Show {
        /// Path to the TOML configuration file
        #[arg(long, default_value = "enrollbot.toml")]
        config: PathBuf,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { config } => {
            let config = Config::load(&config)?;
            // Validate the lesson section so mistakes surface here rather
            // than mid-run.
            config.lesson_spec()?;
            println!("{}", toml::to_string_pretty(&config.redacted())?);
        }
    }
    Ok(())
}
