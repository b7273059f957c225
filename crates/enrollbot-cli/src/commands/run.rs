use clap::Args;
use std::path::PathBuf;

use enrollbot_core::driver::remote::RemoteDriver;
use enrollbot_core::{
    BrowserDriver, Config, ConfigError, NoopNotifier, Notifier, Supervisor, SystemClock,
    WebhookNotifier,
};

#[derive(Args)]
pub struct RunArgs {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "enrollbot.toml")]
    pub config: PathBuf,
    /// Override [timing].retry_secs
    #[arg(long)]
    pub retry_secs: Option<u64>,
    /// Override [timing].max_wait_secs
    #[arg(long)]
    pub max_wait_secs: Option<u64>,
    /// Override [webdriver].endpoint
    #[arg(long)]
    pub webdriver_url: Option<String>,
    /// Disable outcome notifications for this run
    #[arg(long)]
    pub no_notify: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load(&args.config)?;
    if let Some(secs) = args.retry_secs {
        config.timing.retry_secs = secs;
    }
    if let Some(secs) = args.max_wait_secs {
        config.timing.max_wait_secs = secs;
    }
    if let Some(url) = args.webdriver_url {
        config.webdriver.endpoint = url;
    }
    if args.no_notify {
        config.notifications.enabled = false;
    }

    let lesson = config.lesson_spec()?;
    let notifier: Box<dyn Notifier> = match (
        config.notifications.enabled,
        config.notifications.webhook_url.as_deref(),
    ) {
        (true, Some(url)) => Box::new(WebhookNotifier::new(url)?),
        (true, None) => {
            return Err(ConfigError::MissingKey("notifications.webhook_url".into()).into());
        }
        (false, _) => Box::new(NoopNotifier),
    };

    let clock = SystemClock;
    let supervisor = Supervisor::new(
        &lesson,
        &config.credentials,
        config.enrollment_offset(),
        config.timing()?,
        &clock,
        notifier.as_ref(),
    );

    let endpoint = config.webdriver.endpoint.clone();
    let headless = config.webdriver.headless;
    let summary = supervisor.run(move || {
        let driver = RemoteDriver::new_session(&endpoint, headless)?;
        Ok(Box::new(driver) as Box<dyn BrowserDriver>)
    })?;

    println!("Enrolled successfully:\n{summary}");
    Ok(())
}
