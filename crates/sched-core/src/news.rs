//! News-break evaluation.
//!
//! Occurrences recur every `interval_minutes` starting at the rule's `from`
//! anchor, shifted by the global `start_minute_offset`, each lasting
//! `duration_minutes`.  Activity is computed relative to the anchor, not the
//! wall-clock minute-of-hour: with `elapsed` = whole minutes since `from` and
//! `rel = elapsed - offset`, a rule is active iff
//! `rel >= 0 && rel % interval < duration`.
//!
//! The day window is closed on both ends (`from <= t <= to`) while weekly
//! rules are half-open; that asymmetry is deliberate.

use chrono::{Datelike, NaiveDateTime, NaiveTime};
use tracing::warn;

use crate::config::{DayCode, NewsBreaksConfig, NewsRule};

/// Returns the first news rule with an active occurrence at `now`, or None.
///
/// Simple mode evaluates the single `simple` rule (which must name a
/// station); advanced mode walks the ordered `advanced` list, first match
/// wins.  Disabled news or an effective no-news-today flag short-circuit to
/// None — the manual-override / `block_manual` interplay is the resolver's
/// concern, not handled here.
pub fn active_break<'a>(
    cfg: &'a NewsBreaksConfig,
    now: NaiveDateTime,
    no_news_today: bool,
) -> Option<&'a NewsRule> {
    if !cfg.enabled || no_news_today {
        return None;
    }

    if cfg.use_advanced {
        cfg.advanced
            .iter()
            .find(|rule| rule_active(rule, cfg.start_minute_offset, now))
    } else if !cfg.simple.station.is_empty() && rule_active(&cfg.simple, cfg.start_minute_offset, now)
    {
        Some(&cfg.simple)
    } else {
        None
    }
}

fn rule_active(rule: &NewsRule, offset: u32, now: NaiveDateTime) -> bool {
    if !rule.days.contains(&DayCode::from(now.weekday())) {
        return false;
    }
    let Some((from, to)) = rule.window() else {
        return false;
    };
    let t = now.time();
    if t < from || t > to {
        return false;
    }
    if rule.interval_minutes == 0 {
        warn!("skipping news rule with zero interval (station '{}')", rule.station);
        return false;
    }
    let elapsed = minutes_between(from, t);
    let rel = elapsed - i64::from(offset);
    rel >= 0 && rel % i64::from(rule.interval_minutes) < i64::from(rule.duration_minutes)
}

/// Whole minutes from `from` to `t` (`t >= from` assumed; sub-minute part is
/// dropped so an occurrence covers `[start, start + duration)` exactly).
fn minutes_between(from: NaiveTime, t: NaiveTime) -> i64 {
    (t - from).num_minutes()
}

/// Earliest occurrence start strictly after `now`, today only.
///
/// Mirrors the front-end dashboard's enumeration: walk the anchor in
/// `interval` steps through the rule window, apply the offset, keep triggers
/// after `now` whose clock time has not passed `to`.  The daemon surfaces
/// this in its heartbeat log.
pub fn next_break(
    cfg: &NewsBreaksConfig,
    now: NaiveDateTime,
    no_news_today: bool,
) -> Option<NaiveDateTime> {
    if !cfg.enabled || no_news_today {
        return None;
    }

    let today = DayCode::from(now.weekday());
    let mut candidates: Vec<NaiveDateTime> = Vec::new();

    let mut collect = |rule: &NewsRule| {
        if !rule.days.contains(&today) {
            return;
        }
        let Some((from, to)) = rule.window() else {
            return;
        };
        if rule.interval_minutes == 0 {
            return;
        }
        let mut anchor = now.date().and_time(from);
        let end = now.date().and_time(to);
        while anchor <= end {
            let trigger = anchor + chrono::Duration::minutes(i64::from(cfg.start_minute_offset));
            if trigger > now && trigger.time() <= to {
                candidates.push(trigger);
            }
            anchor += chrono::Duration::minutes(i64::from(rule.interval_minutes));
        }
    };

    if cfg.use_advanced {
        for rule in &cfg.advanced {
            collect(rule);
        }
    } else if !cfg.simple.station.is_empty() {
        collect(&cfg.simple);
    }

    candidates.into_iter().min()
}
