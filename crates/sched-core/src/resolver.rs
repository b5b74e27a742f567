//! Schedule resolution: combines news breaks, the manual override, weekly
//! rules, and the default station into a single target for this cycle.
//!
//! Precedence, most to least authoritative:
//! news break > manual override > weekly schedule > default station > nothing.
//! `block_manual` inverts only the news/manual edge: with it set, an active
//! override suppresses news instead of being interrupted.

use chrono::{Datelike, NaiveDateTime};

use crate::config::{DayCode, ScheduleConfig};
use crate::news;

/// Outcome of one evaluation cycle.  `target == None` means "leave whatever
/// is currently playing alone".
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub target: Option<String>,
    pub news_active: bool,
}

/// Evaluate the priority cascade at `now`.  Stateless: call fresh every
/// polling tick.
pub fn resolve(
    schedule: &ScheduleConfig,
    now: NaiveDateTime,
    manual_override: bool,
    no_news_today: bool,
) -> Resolution {
    let news_suppressed = manual_override && schedule.news_breaks.block_manual;
    if !news_suppressed {
        if let Some(rule) = news::active_break(&schedule.news_breaks, now, no_news_today) {
            return Resolution {
                target: Some(rule.station.clone()),
                news_active: true,
            };
        }
    }

    if manual_override {
        return Resolution {
            target: None,
            news_active: false,
        };
    }

    let day = DayCode::from(now.weekday());
    let t = now.time();
    for rule in &schedule.weekly {
        if !rule.days.contains(&day) {
            continue;
        }
        // Malformed times skip just this rule (already logged by the parser).
        let Some((from, to)) = rule.window() else {
            continue;
        };
        // Weekly windows are half-open, unlike news windows.
        if from <= t && t < to {
            return Resolution {
                target: Some(rule.station.clone()),
                news_active: false,
            };
        }
    }

    let target = if schedule.default.is_empty() {
        None
    } else {
        Some(schedule.default.clone())
    };
    Resolution {
        target,
        news_active: false,
    }
}

/// Transition rule: issue a play command when the target differs from what is
/// playing, or when `force_resume` demands a non-idempotent replay (a news
/// break ended this cycle and the underlying schedule must be resumed even if
/// the URL looks unchanged).
pub fn should_switch(target_url: &str, current_url: Option<&str>, force_resume: bool) -> bool {
    force_resume || current_url != Some(target_url)
}
