//! The polling loop: re-evaluate the schedule every tick and command the
//! player only on a real transition.

use chrono::{DateTime, Datelike, Local, Timelike};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use sched_core::config::{self, Config};
use sched_core::flags::{NoNewsFile, NoNewsToday, OverrideController, OverrideLockFile};
use sched_core::platform;
use sched_core::{news, resolver};

use crate::mpd::MpdClient;

const POLL_INTERVAL: Duration = Duration::from_secs(10);

pub struct Daemon {
    config_path: PathBuf,
    mpd: MpdClient,
    overrides: OverrideController<OverrideLockFile>,
    no_news: NoNewsToday<NoNewsFile>,
    /// What we last commanded to play — change-detection fallback when the
    /// player's status query fails.
    last_target_url: Option<String>,
    /// Previous cycle's news-active bit, for the forced-resume rule.
    was_news_active: bool,
    last_logged_minute: Option<u32>,
}

impl Daemon {
    pub fn new() -> Self {
        let config = Config::load_or_default(&platform::config_path());
        Self::with_paths(
            platform::config_path(),
            platform::manual_override_lock(),
            platform::no_news_today_flag(),
            config.player.address,
        )
    }

    pub fn with_paths(
        config_path: PathBuf,
        override_lock: PathBuf,
        no_news_flag: PathBuf,
        mpd_address: String,
    ) -> Self {
        Self {
            config_path,
            mpd: MpdClient::new(mpd_address),
            overrides: OverrideController::new(OverrideLockFile::new(override_lock)),
            no_news: NoNewsToday::new(NoNewsFile::new(no_news_flag)),
            last_target_url: None,
            was_news_active: false,
            last_logged_minute: None,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        self.write_pid_file().await?;
        info!("daemon started, polling every {:?}", POLL_INTERVAL);
        loop {
            self.tick(Local::now()).await;
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// One evaluation cycle.  Config and flags are re-read fresh so external
    /// edits take effect without a restart; nothing in here may abort the
    /// loop.
    pub async fn tick(&mut self, now: DateTime<Local>) {
        let config = Config::load_or_default(&self.config_path);
        let local_now = now.naive_local();

        let no_news_today = self.no_news.is_set(now.date_naive());
        let manual_override = self.overrides.is_active(now, config.auto_resume_minutes);

        if self.last_logged_minute != Some(now.minute()) {
            let next_news =
                news::next_break(&config.schedule.news_breaks, local_now, no_news_today);
            info!(
                "heartbeat: day={} time={} manual={} no_news={} next_news={}",
                config::DayCode::from(now.weekday()).as_str(),
                now.format("%H:%M"),
                manual_override,
                no_news_today,
                next_news
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
            self.last_logged_minute = Some(now.minute());
        }

        let resolution =
            resolver::resolve(&config.schedule, local_now, manual_override, no_news_today);
        let force_resume = self.was_news_active && !resolution.news_active;

        if let Some(name) = &resolution.target {
            if let Some(url) = config::station_url(&config.stations, name) {
                // The player's own answer is authoritative; fall back to our
                // memory of the last command when the status query fails.
                let playing = match self.mpd.current_url().await {
                    Ok(current) => current,
                    Err(e) => {
                        warn!("player status unavailable: {}", e);
                        self.last_target_url.clone()
                    }
                };
                if resolver::should_switch(url, playing.as_deref(), force_resume) {
                    info!("changing station to: {} ({})", name, url);
                    match self.mpd.play_url(url).await {
                        Ok(()) => self.last_target_url = Some(url.to_string()),
                        Err(e) => warn!("playback command failed: {}", e),
                    }
                }
            }
        }

        self.was_news_active = resolution.news_active;
    }

    async fn write_pid_file(&self) -> anyhow::Result<()> {
        let path = platform::pid_file();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, std::process::id().to_string()).await?;
        Ok(())
    }
}
