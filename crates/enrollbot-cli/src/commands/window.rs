use clap::Args;
use std::path::PathBuf;

use chrono::Duration as ChronoDuration;
use enrollbot_core::{Clock, Config, ScheduleWindow, SystemClock};

#[derive(Args)]
pub struct WindowArgs {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "enrollbot.toml")]
    pub config: PathBuf,
}

pub fn run(args: WindowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&args.config)?;
    let lesson = config.lesson_spec()?;
    let now = SystemClock.now();
    let window = ScheduleWindow::for_lesson(&lesson, config.enrollment_offset(), now);

    println!("lesson at:        {}", window.lesson_at);
    println!("enrollment opens: {}", window.opens_at);

    let remaining = window.opens_at - now;
    if remaining > ChronoDuration::zero() {
        let secs = remaining.num_seconds();
        println!(
            "opens in:         {}h {:02}m {:02}s",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        );
    } else {
        println!("enrollment window is already open");
    }
    Ok(())
}
