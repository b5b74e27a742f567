use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, warn};

use super::platform;

/// The shared configuration document.  The GUI/tray front-end owns mutation;
/// the daemon re-reads it every polling cycle so external edits take effect
/// without a restart.  Unknown keys (front-end UI settings such as `language`
/// or `shortcuts`) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Minutes after which a manual override expires on its own.  0 disables
    /// auto-resume.
    #[serde(default)]
    pub auto_resume_minutes: u32,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// MPD control socket address.
    #[serde(default = "default_mpd_address")]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Station {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScheduleConfig {
    /// Fallback station when no weekly rule matches.  Empty = play nothing.
    #[serde(default)]
    pub default: String,
    /// Declaration order is significant: the first matching rule wins.
    #[serde(default)]
    pub weekly: Vec<WeeklyRule>,
    #[serde(default)]
    pub news_breaks: NewsBreaksConfig,
}

/// "During these weekdays, between `from` (inclusive) and `to` (exclusive),
/// this station should play."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRule {
    pub days: Vec<DayCode>,
    pub from: String,
    pub to: String,
    pub station: String,
}

impl WeeklyRule {
    /// Parsed time window, or None (logged) when either bound is malformed.
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((parse_clock(&self.from)?, parse_clock(&self.to)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsBreaksConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When true, an active manual override suppresses news breaks instead of
    /// being interrupted by them.
    #[serde(default = "default_true")]
    pub block_manual: bool,
    /// Global shift (0..59 minutes) applied to every occurrence start.
    #[serde(default)]
    pub start_minute_offset: u32,
    #[serde(default)]
    pub use_advanced: bool,
    #[serde(default)]
    pub simple: NewsRule,
    /// Ordered; the first matching rule wins.
    #[serde(default)]
    pub advanced: Vec<NewsRule>,
}

impl Default for NewsBreaksConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            block_manual: default_true(),
            start_minute_offset: 0,
            use_advanced: false,
            simple: NewsRule::default(),
            advanced: Vec::new(),
        }
    }
}

/// One recurring news-break pattern.  Shared by simple mode (exactly one) and
/// advanced mode (an ordered list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRule {
    #[serde(default)]
    pub station: String,
    #[serde(default = "all_days")]
    pub days: Vec<DayCode>,
    #[serde(default = "default_news_from")]
    pub from: String,
    #[serde(default = "default_news_to")]
    pub to: String,
    #[serde(default = "default_news_interval")]
    pub interval_minutes: u32,
    #[serde(default = "default_news_duration")]
    pub duration_minutes: u32,
}

impl Default for NewsRule {
    fn default() -> Self {
        Self {
            station: String::new(),
            days: all_days(),
            from: default_news_from(),
            to: default_news_to(),
            interval_minutes: default_news_interval(),
            duration_minutes: default_news_duration(),
        }
    }
}

impl NewsRule {
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((parse_clock(&self.from)?, parse_clock(&self.to)?))
    }
}

/// Weekday code as stored in the config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayCode::Mon => "mon",
            DayCode::Tue => "tue",
            DayCode::Wed => "wed",
            DayCode::Thu => "thu",
            DayCode::Fri => "fri",
            DayCode::Sat => "sat",
            DayCode::Sun => "sun",
        }
    }
}

impl From<Weekday> for DayCode {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayCode::Mon,
            Weekday::Tue => DayCode::Tue,
            Weekday::Wed => DayCode::Wed,
            Weekday::Thu => DayCode::Thu,
            Weekday::Fri => DayCode::Fri,
            Weekday::Sat => DayCode::Sat,
            Weekday::Sun => DayCode::Sun,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            address: default_mpd_address(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_mpd_address() -> String {
    platform::mpd_address()
}

fn all_days() -> Vec<DayCode> {
    vec![
        DayCode::Mon,
        DayCode::Tue,
        DayCode::Wed,
        DayCode::Thu,
        DayCode::Fri,
        DayCode::Sat,
        DayCode::Sun,
    ]
}

fn default_news_from() -> String {
    "00:00".to_string()
}

fn default_news_to() -> String {
    "22:00".to_string()
}

fn default_news_interval() -> u32 {
    60
}

fn default_news_duration() -> u32 {
    8
}

/// Parse a "HH:MM" clock time.  Malformed values are logged and skipped so a
/// single bad rule never aborts the whole evaluation cycle.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    match NaiveTime::parse_from_str(value, "%H:%M") {
        Ok(t) => Some(t),
        Err(e) => {
            warn!("skipping rule with malformed time '{}': {}", value, e);
            None
        }
    }
}

/// Resolve a station name to its stream URL.  A non-empty name with no match
/// is logged; the caller treats it as "no playable target this cycle".
pub fn station_url<'a>(stations: &'a [Station], name: &str) -> Option<&'a str> {
    for s in stations {
        if s.name == name {
            return Some(&s.url);
        }
    }
    if !name.is_empty() {
        error!("station not found: {}", name);
    }
    None
}

impl Config {
    /// Read the config document from `path`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Per-cycle load: any failure (missing file, torn write, parse error)
    /// yields the default config for this cycle only.  Never writes.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                error!("error loading configuration: {:#}", e);
                Self::default()
            }
        }
    }

    /// Write the document back.  Used by the front-end side; the daemon only
    /// reads.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
