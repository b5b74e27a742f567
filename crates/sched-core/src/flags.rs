//! Manual-override and no-news-today flags.
//!
//! Both are externally-observable markers any process may set or clear: the
//! tray front-end toggles them, the daemon reads them every cycle (and clears
//! the override on auto-resume expiry).  The storage is behind small traits so
//! the resolution logic is testable without a filesystem; the shipped
//! implementations are the lock files under the shared config directory.

use chrono::{DateTime, Local, NaiveDate};
use std::path::PathBuf;
use tracing::{info, warn};

// ── manual override ───────────────────────────────────────────────────────────

pub trait OverrideFlag {
    /// Creation time of the flag, or None when inactive.
    fn created_at(&self) -> Option<DateTime<Local>>;
    fn touch(&self) -> anyhow::Result<()>;
    fn remove(&self) -> anyhow::Result<()>;
}

/// Lock-file implementation: existence is the flag, mtime is the creation
/// time.
pub struct OverrideLockFile {
    path: PathBuf,
}

impl OverrideLockFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl OverrideFlag for OverrideLockFile {
    fn created_at(&self) -> Option<DateTime<Local>> {
        let meta = std::fs::metadata(&self.path).ok()?;
        let mtime = meta.modified().ok()?;
        Some(DateTime::<Local>::from(mtime))
    }

    fn touch(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, b"")?;
        Ok(())
    }

    fn remove(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Manual-override lifecycle, including time-based auto-expiry.
pub struct OverrideController<F: OverrideFlag> {
    flag: F,
}

impl<F: OverrideFlag> OverrideController<F> {
    pub fn new(flag: F) -> Self {
        Self { flag }
    }

    /// True while the override is in force.  With `auto_resume_minutes > 0`,
    /// a flag older than that is cleared as a side effect and reported
    /// inactive — the manual → automatic transition.
    pub fn is_active(&self, now: DateTime<Local>, auto_resume_minutes: u32) -> bool {
        let Some(created) = self.flag.created_at() else {
            return false;
        };
        if auto_resume_minutes > 0 {
            let age = now.signed_duration_since(created);
            if age.num_seconds() > i64::from(auto_resume_minutes) * 60 {
                info!(
                    "auto-resume: manual override expired after {} minutes",
                    auto_resume_minutes
                );
                if let Err(e) = self.flag.remove() {
                    warn!("failed to clear manual override lock: {:#}", e);
                }
                return false;
            }
        }
        true
    }

    /// Used when the user manually starts playback.
    pub fn activate(&self) -> anyhow::Result<()> {
        self.flag.touch()
    }

    /// "Return to schedule": removes the flag unconditionally.
    pub fn deactivate(&self) -> anyhow::Result<()> {
        self.flag.remove()
    }
}

// ── no news today ─────────────────────────────────────────────────────────────

pub trait NoNewsFlag {
    /// Date the flag was set for, or None when absent/unreadable.
    fn date(&self) -> Option<NaiveDate>;
    fn set(&self, date: NaiveDate) -> anyhow::Result<()>;
    fn remove(&self) -> anyhow::Result<()>;
}

/// File implementation: the content is an ISO date string.
pub struct NoNewsFile {
    path: PathBuf,
}

impl NoNewsFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl NoNewsFlag for NoNewsFile {
    fn date(&self) -> Option<NaiveDate> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        NaiveDate::parse_from_str(content.trim(), "%Y-%m-%d").ok()
    }

    fn set(&self, date: NaiveDate) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, format!("{}", date.format("%Y-%m-%d")))?;
        Ok(())
    }

    fn remove(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Date-stamped suppression marker.  A stale date is logically ignored, never
/// deleted from disk.
pub struct NoNewsToday<F: NoNewsFlag> {
    flag: F,
}

impl<F: NoNewsFlag> NoNewsToday<F> {
    pub fn new(flag: F) -> Self {
        Self { flag }
    }

    pub fn is_set(&self, today: NaiveDate) -> bool {
        self.flag.date() == Some(today)
    }

    pub fn set_for(&self, today: NaiveDate) -> anyhow::Result<()> {
        self.flag.set(today)
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.flag.remove()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Mutex;

    struct MemoryOverride {
        created: Mutex<Option<DateTime<Local>>>,
    }

    impl MemoryOverride {
        fn at(created: DateTime<Local>) -> Self {
            Self {
                created: Mutex::new(Some(created)),
            }
        }
    }

    impl OverrideFlag for MemoryOverride {
        fn created_at(&self) -> Option<DateTime<Local>> {
            *self.created.lock().unwrap()
        }

        fn touch(&self) -> anyhow::Result<()> {
            *self.created.lock().unwrap() = Some(Local::now());
            Ok(())
        }

        fn remove(&self) -> anyhow::Result<()> {
            *self.created.lock().unwrap() = None;
            Ok(())
        }
    }

    #[test]
    fn test_override_inactive_when_absent() {
        let ctl = OverrideController::new(MemoryOverride {
            created: Mutex::new(None),
        });
        assert!(!ctl.is_active(Local::now(), 5));
    }

    #[test]
    fn test_auto_resume_clears_expired_lock() {
        let now = Local::now();
        let ctl = OverrideController::new(MemoryOverride::at(now - Duration::minutes(6)));
        // 6-minute-old lock, 5-minute budget: expired, cleared as a side effect.
        assert!(!ctl.is_active(now, 5));
        assert!(ctl.flag.created_at().is_none());
        // Subsequent evaluations stay inactive.
        assert!(!ctl.is_active(now, 5));
    }

    #[test]
    fn test_override_survives_within_budget() {
        let now = Local::now();
        let ctl = OverrideController::new(MemoryOverride::at(now - Duration::minutes(4)));
        assert!(ctl.is_active(now, 5));
        assert!(ctl.flag.created_at().is_some());
    }

    #[test]
    fn test_zero_budget_disables_auto_resume() {
        let now = Local::now();
        let ctl = OverrideController::new(MemoryOverride::at(now - Duration::days(3)));
        assert!(ctl.is_active(now, 0));
    }

    #[test]
    fn test_expiry_is_strictly_greater_at_seconds_precision() {
        let now = Local::now();
        let ctl = OverrideController::new(MemoryOverride::at(now - Duration::seconds(300)));
        // Exactly five minutes old: not yet expired.
        assert!(ctl.is_active(now, 5));
        let ctl = OverrideController::new(MemoryOverride::at(now - Duration::seconds(301)));
        assert!(!ctl.is_active(now, 5));
    }

    #[test]
    fn test_lock_file_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let flag = OverrideLockFile::new(dir.path().join("manual_override.lock"));
        assert!(flag.created_at().is_none());
        flag.touch().unwrap();
        assert!(flag.created_at().is_some());
        flag.remove().unwrap();
        assert!(flag.created_at().is_none());
        // Removing an absent lock is not an error.
        flag.remove().unwrap();
    }

    #[test]
    fn test_controller_activate_deactivate() {
        let dir = tempfile::tempdir().unwrap();
        let ctl =
            OverrideController::new(OverrideLockFile::new(dir.path().join("manual_override.lock")));
        ctl.activate().unwrap();
        assert!(ctl.is_active(Local::now(), 0));
        ctl.deactivate().unwrap();
        assert!(!ctl.is_active(Local::now(), 0));
    }

    #[test]
    fn test_no_news_today_matches_only_today() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-news-today");
        let no_news = NoNewsToday::new(NoNewsFile::new(path.clone()));
        let today = Local::now().date_naive();

        assert!(!no_news.is_set(today));
        no_news.set_for(today).unwrap();
        assert!(no_news.is_set(today));
        // Tomorrow the same file no longer applies, but stays on disk.
        assert!(!no_news.is_set(today + Duration::days(1)));
        assert!(path.exists());

        no_news.clear().unwrap();
        assert!(!no_news.is_set(today));
    }

    #[test]
    fn test_no_news_file_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-news-today");
        std::fs::write(&path, "not a date").unwrap();
        let no_news = NoNewsToday::new(NoNewsFile::new(path));
        assert!(!no_news.is_set(Local::now().date_naive()));
    }
}
