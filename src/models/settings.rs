// src/models/settings.rs
use serde::{Deserialize, Serialize};

/// Durable notification configuration, one record per installation.
///
/// Persisted as JSON under the `notificationSettings` key with camelCase
/// field names. Every field is guaranteed present after
/// `SettingsStore::initialize()` — a partial or legacy record is merged
/// over these defaults.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Global kill switch. Overrides everything else when false.
    pub notifications_enabled: bool,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,

    // Per-category flags
    pub ride_requests: bool,
    pub ride_updates: bool,
    pub ride_completed: bool,
    pub payment_received: bool,
    pub system_notifications: bool,
    pub offline_reminders: bool,
    pub pickup_reminders: bool,

    /// Quiet-hours window, boundaries in 24h "HH:mm".
    pub quiet_hours_enabled: bool,
    pub quiet_hours_start: String,
    pub quiet_hours_end: String,
    /// During quiet hours, allow only ride offers and payment events.
    pub priority_only: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            sound_enabled: true,
            vibration_enabled: true,
            ride_requests: true,
            ride_updates: true,
            ride_completed: true,
            payment_received: true,
            system_notifications: true,
            offline_reminders: true,
            pickup_reminders: true,
            quiet_hours_enabled: false,
            quiet_hours_start: "22:00".to_string(),
            quiet_hours_end: "07:00".to_string(),
            priority_only: false,
        }
    }
}

/// Typed partial update over [`NotificationSettings`].
///
/// Deserializes from a partial JSON object (legacy records included), so the
/// provenance of every field after a merge is explicit: `Some` came from the
/// stored/updated record, `None` falls through to the default.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibration_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ride_requests: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ride_updates: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ride_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_received: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_reminders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_reminders: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_hours_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_hours_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet_hours_end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_only: Option<bool>,
}

impl SettingsPatch {
    /// Overlay the present fields onto `settings`, leaving the rest alone.
    pub fn apply_to(&self, settings: &mut NotificationSettings) {
        if let Some(v) = self.notifications_enabled {
            settings.notifications_enabled = v;
        }
        if let Some(v) = self.sound_enabled {
            settings.sound_enabled = v;
        }
        if let Some(v) = self.vibration_enabled {
            settings.vibration_enabled = v;
        }
        if let Some(v) = self.ride_requests {
            settings.ride_requests = v;
        }
        if let Some(v) = self.ride_updates {
            settings.ride_updates = v;
        }
        if let Some(v) = self.ride_completed {
            settings.ride_completed = v;
        }
        if let Some(v) = self.payment_received {
            settings.payment_received = v;
        }
        if let Some(v) = self.system_notifications {
            settings.system_notifications = v;
        }
        if let Some(v) = self.offline_reminders {
            settings.offline_reminders = v;
        }
        if let Some(v) = self.pickup_reminders {
            settings.pickup_reminders = v;
        }
        if let Some(v) = self.quiet_hours_enabled {
            settings.quiet_hours_enabled = v;
        }
        if let Some(ref v) = self.quiet_hours_start {
            settings.quiet_hours_start = v.clone();
        }
        if let Some(ref v) = self.quiet_hours_end {
            settings.quiet_hours_end = v.clone();
        }
        if let Some(v) = self.priority_only {
            settings.priority_only = v;
        }
    }

    /// True when every field is present, i.e. the source record needed no
    /// defaults filled in.
    pub fn is_complete(&self) -> bool {
        self.notifications_enabled.is_some()
            && self.sound_enabled.is_some()
            && self.vibration_enabled.is_some()
            && self.ride_requests.is_some()
            && self.ride_updates.is_some()
            && self.ride_completed.is_some()
            && self.payment_received.is_some()
            && self.system_notifications.is_some()
            && self.offline_reminders.is_some()
            && self.pickup_reminders.is_some()
            && self.quiet_hours_enabled.is_some()
            && self.quiet_hours_start.is_some()
            && self.quiet_hours_end.is_some()
            && self.priority_only.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_permissive() {
        let settings = NotificationSettings::default();
        assert!(settings.notifications_enabled);
        assert!(settings.ride_requests);
        assert!(!settings.quiet_hours_enabled);
        assert!(!settings.priority_only);
        assert_eq!(settings.quiet_hours_start, "22:00");
        assert_eq!(settings.quiet_hours_end, "07:00");
    }

    #[test]
    fn test_partial_patch_overlays_only_present_fields() {
        let mut settings = NotificationSettings::default();
        let patch: SettingsPatch =
            serde_json::from_str(r#"{"soundEnabled": false, "quietHoursStart": "21:30"}"#)
                .unwrap();
        assert!(!patch.is_complete());

        patch.apply_to(&mut settings);
        assert!(!settings.sound_enabled);
        assert_eq!(settings.quiet_hours_start, "21:30");
        // Untouched fields keep their defaults
        assert!(settings.vibration_enabled);
        assert_eq!(settings.quiet_hours_end, "07:00");
    }

    #[test]
    fn test_full_record_round_trips_as_complete_patch() {
        let json = serde_json::to_string(&NotificationSettings::default()).unwrap();
        let patch: SettingsPatch = serde_json::from_str(&json).unwrap();
        assert!(patch.is_complete());
    }

    #[test]
    fn test_persisted_keys_are_camel_case() {
        let json = serde_json::to_string(&NotificationSettings::default()).unwrap();
        assert!(json.contains("\"notificationsEnabled\""));
        assert!(json.contains("\"quietHoursStart\""));
        assert!(json.contains("\"priorityOnly\""));
    }
}
