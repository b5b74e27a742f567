use std::path::PathBuf;

/// Default address of the MPD control socket.
pub const MPD_TCP_HOST: &str = "127.0.0.1";
pub const MPD_TCP_PORT: u16 = 6600;

pub fn mpd_address() -> String {
    format!("{}:{}", MPD_TCP_HOST, MPD_TCP_PORT)
}

/// Configuration directory shared with the GUI/tray front-end.
/// All inter-process coordination (config document, lock files) lives here.
pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("radio-scheduler")
    }
    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("radio-scheduler")
    }
}

/// Daemon-private data directory (log, pid file).
pub fn data_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("radio-scheduler")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("radio-scheduler")
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Existence of this file means a user-initiated manual override is active.
/// Its mtime is the override creation time (auto-resume is measured from it).
pub fn manual_override_lock() -> PathBuf {
    config_dir().join("manual_override.lock")
}

/// Holds an ISO date; news breaks are suppressed while it matches today.
pub fn no_news_today_flag() -> PathBuf {
    config_dir().join("no-news-today")
}

pub fn pid_file() -> PathBuf {
    data_dir().join("daemon.pid")
}

pub fn log_file() -> PathBuf {
    data_dir().join("daemon.log")
}
