// src/services/channels.rs
use crate::models::notification::{Channel, ChannelSpec, Importance, NotificationCategory};
use crate::models::settings::NotificationSettings;

/// Pure category -> channel / governing-flag lookup.
///
/// RideCompleted shares the RideUpdates channel but is governed by its own
/// `rideCompleted` flag, not `rideUpdates`.
pub struct ChannelClassifier;

impl ChannelClassifier {
    pub fn channel_for(category: NotificationCategory) -> Channel {
        match category {
            NotificationCategory::RideRequest => Channel::RideRequests,
            NotificationCategory::RideUpdate => Channel::RideUpdates,
            NotificationCategory::RideCompleted => Channel::RideUpdates,
            NotificationCategory::PaymentReceived => Channel::Payments,
            NotificationCategory::SystemGeneric => Channel::SystemDefault,
        }
    }

    /// Persisted field name of the flag governing this category.
    pub fn governing_flag(category: NotificationCategory) -> &'static str {
        match category {
            NotificationCategory::RideRequest => "rideRequests",
            NotificationCategory::RideUpdate => "rideUpdates",
            NotificationCategory::RideCompleted => "rideCompleted",
            NotificationCategory::PaymentReceived => "paymentReceived",
            NotificationCategory::SystemGeneric => "systemNotifications",
        }
    }

    /// Typed read of the governing flag.
    pub fn category_enabled(settings: &NotificationSettings, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::RideRequest => settings.ride_requests,
            NotificationCategory::RideUpdate => settings.ride_updates,
            NotificationCategory::RideCompleted => settings.ride_completed,
            NotificationCategory::PaymentReceived => settings.payment_received,
            NotificationCategory::SystemGeneric => settings.system_notifications,
        }
    }

    /// Registration specs for every channel, used once at engine startup.
    pub fn all_channel_specs() -> [ChannelSpec; 4] {
        [
            Channel::RideRequests.spec(),
            Channel::RideUpdates.spec(),
            Channel::Payments.spec(),
            Channel::SystemDefault.spec(),
        ]
    }
}

impl Channel {
    pub fn spec(&self) -> ChannelSpec {
        match self {
            Channel::RideRequests => ChannelSpec {
                id: "ride_requests",
                name: "Ride Requests",
                importance: Importance::High,
                vibration_pattern: &[0, 250, 250, 250],
                sound: true,
                show_badge: true,
            },
            Channel::RideUpdates => ChannelSpec {
                id: "ride_updates",
                name: "Ride Updates",
                importance: Importance::Default,
                vibration_pattern: &[0, 250],
                sound: true,
                show_badge: true,
            },
            Channel::Payments => ChannelSpec {
                id: "payments",
                name: "Payments",
                importance: Importance::Default,
                vibration_pattern: &[0, 250],
                sound: true,
                show_badge: true,
            },
            Channel::SystemDefault => ChannelSpec {
                id: "system_default",
                name: "System",
                importance: Importance::Low,
                vibration_pattern: &[],
                sound: false,
                show_badge: false,
            },
        }
    }

    pub fn importance(&self) -> Importance {
        self.spec().importance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ride_completed_shares_channel_with_ride_update() {
        assert_eq!(
            ChannelClassifier::channel_for(NotificationCategory::RideCompleted),
            ChannelClassifier::channel_for(NotificationCategory::RideUpdate)
        );
        // ...while their governing flags differ
        assert_ne!(
            ChannelClassifier::governing_flag(NotificationCategory::RideCompleted),
            ChannelClassifier::governing_flag(NotificationCategory::RideUpdate)
        );
    }

    #[test]
    fn test_ride_completed_governed_by_own_flag() {
        let settings = NotificationSettings {
            ride_updates: true,
            ride_completed: false,
            ..Default::default()
        };
        assert!(!ChannelClassifier::category_enabled(
            &settings,
            NotificationCategory::RideCompleted
        ));
        assert!(ChannelClassifier::category_enabled(
            &settings,
            NotificationCategory::RideUpdate
        ));
    }

    #[test]
    fn test_channel_importance_hints() {
        assert_eq!(Channel::RideRequests.importance(), Importance::High);
        assert_eq!(Channel::RideUpdates.importance(), Importance::Default);
        assert_eq!(Channel::Payments.importance(), Importance::Default);
        assert_eq!(Channel::SystemDefault.importance(), Importance::Low);
    }

    #[test]
    fn test_channel_specs_have_unique_ids() {
        let specs = ChannelClassifier::all_channel_specs();
        let mut ids: Vec<_> = specs.iter().map(|s| s.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }
}
