// src/services/policy.rs
use chrono::{Local, NaiveTime, Timelike};
use std::sync::Arc;
use tracing;

use crate::{
    models::notification::NotificationCategory,
    services::channels::ChannelClassifier,
    services::settings_store::SettingsStore,
};

/// Wall-clock seam so quiet-hours decisions are testable at a fixed time.
pub trait Clock: Send + Sync {
    fn time_of_day(&self) -> NaiveTime;
}

/// Device-local wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Sound/vibration hints resolved for an already-allowed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryHints {
    pub sound: bool,
    pub vibration: bool,
}

/// Answers "is this category deliverable right now, and with what hints".
///
/// Precedence is strict: global kill switch, then quiet-hours suppression
/// (with the priority-exception allowlist), then the per-category flag.
pub struct PolicyResolver {
    settings: Arc<SettingsStore>,
    clock: Arc<dyn Clock>,
}

impl PolicyResolver {
    pub fn new(settings: Arc<SettingsStore>, clock: Arc<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    pub async fn is_enabled(&self, category: NotificationCategory) -> bool {
        let settings = self.settings.get_settings().await;

        if !settings.notifications_enabled {
            return false;
        }

        if settings.quiet_hours_enabled
            && in_quiet_window(
                self.clock.time_of_day(),
                &settings.quiet_hours_start,
                &settings.quiet_hours_end,
            )
        {
            if settings.priority_only {
                return category.is_priority();
            }
            tracing::debug!("Suppressing {:?} during quiet hours", category);
            return false;
        }

        ChannelClassifier::category_enabled(&settings, category)
    }

    /// Global sound/vibration flags, independent of the enablement decision.
    pub async fn resolve_delivery_hints(&self, _category: NotificationCategory) -> DeliveryHints {
        let settings = self.settings.get_settings().await;
        DeliveryHints {
            sound: settings.sound_enabled,
            vibration: settings.vibration_enabled,
        }
    }
}

/// Quiet-window membership over minutes-since-midnight.
///
/// `start <= end` is a bounded same-day interval `[start, end)`; `start > end`
/// wraps midnight (`now >= start || now < end`). The two cases are kept
/// separate: a 09:00-17:00 window must never be evaluated with overnight
/// semantics. An unparsable boundary disables the window.
fn in_quiet_window(now: NaiveTime, start: &str, end: &str) -> bool {
    let (start_min, end_min) = match (parse_minutes(start), parse_minutes(end)) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            tracing::warn!("Unparsable quiet-hours boundary ({} - {}), window disabled", start, end);
            return false;
        }
    };
    let now_min = now.hour() * 60 + now.minute();

    if start_min <= end_min {
        now_min >= start_min && now_min < end_min
    } else {
        now_min >= start_min || now_min < end_min
    }
}

fn parse_minutes(hhmm: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(hhmm, "%H:%M").ok()?;
    Some(time.hour() * 60 + time.minute())
}
