// src/models/notification.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Closed set of notification kinds the engine knows how to police.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    RideRequest,     // Incoming ride offer, time-critical
    RideUpdate,      // Ride-state change during an active ride
    RideCompleted,   // Ride finished, earnings summary
    PaymentReceived, // Payout / payment event
    SystemGeneric,   // App-level messages, maintenance notices
}

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 5] = [
        NotificationCategory::RideRequest,
        NotificationCategory::RideUpdate,
        NotificationCategory::RideCompleted,
        NotificationCategory::PaymentReceived,
        NotificationCategory::SystemGeneric,
    ];

    /// Categories allowed through quiet hours when `priority_only` is set.
    pub fn is_priority(&self) -> bool {
        matches!(
            self,
            NotificationCategory::RideRequest | NotificationCategory::PaymentReceived
        )
    }
}

/// Platform delivery bucket. Several categories can share one channel while
/// being governed by different settings flags.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    RideRequests,
    RideUpdates,
    Payments,
    SystemDefault,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    High,    // Will wake sleeping devices
    Default,
    Low,
}

/// What the platform collaborator needs to register a delivery channel.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChannelSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub importance: Importance,
    pub vibration_pattern: &'static [u64],
    pub sound: bool,
    pub show_badge: bool,
}

/// Ephemeral delivery request, built by ride-lifecycle glue outside this
/// engine. Title and body arrive already localized; payload is opaque and
/// forwarded verbatim to the platform.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub category: NotificationCategory,
    pub title: String,
    pub body: String,
    pub payload: Map<String, Value>,
}

impl NotificationRequest {
    pub fn new(category: NotificationCategory, title: &str, body: &str) -> Self {
        Self {
            category,
            title: title.to_string(),
            body: body.to_string(),
            payload: Map::new(),
        }
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Assemble a request from ride data plus pre-localized strings.
    pub fn from_ride(
        category: NotificationCategory,
        title: &str,
        body: &str,
        ride: &RideNotificationData,
    ) -> Self {
        Self {
            category,
            title: title.to_string(),
            body: body.to_string(),
            payload: ride.to_payload(),
        }
    }
}

/// Inbound contract from the ride-lifecycle glue.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RideNotificationData {
    pub ride_id: String,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub fare: Option<f64>,
    pub passenger_name: Option<String>,
    pub estimated_time: Option<String>,
    pub distance: Option<String>,
}

impl RideNotificationData {
    /// Flatten into the opaque payload map forwarded to the platform. Absent
    /// optionals are omitted rather than serialized as null.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("rideId".to_string(), json!(self.ride_id));
        if let Some(ref v) = self.pickup_location {
            payload.insert("pickupLocation".to_string(), json!(v));
        }
        if let Some(ref v) = self.dropoff_location {
            payload.insert("dropoffLocation".to_string(), json!(v));
        }
        if let Some(v) = self.fare {
            payload.insert("fare".to_string(), json!(v));
        }
        if let Some(ref v) = self.passenger_name {
            payload.insert("passengerName".to_string(), json!(v));
        }
        if let Some(ref v) = self.estimated_time {
            payload.insert("estimatedTime".to_string(), json!(v));
        }
        if let Some(ref v) = self.distance {
            payload.insert("distance".to_string(), json!(v));
        }
        payload
    }
}

/// When a deferred notification should fire. Opaque to the engine; the
/// platform collaborator interprets it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleTrigger {
    /// Fire once at a point in time.
    At(DateTime<Utc>),
    /// Repeat on a fixed interval.
    Every(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_allowlist() {
        assert!(NotificationCategory::RideRequest.is_priority());
        assert!(NotificationCategory::PaymentReceived.is_priority());
        assert!(!NotificationCategory::RideUpdate.is_priority());
        assert!(!NotificationCategory::RideCompleted.is_priority());
        assert!(!NotificationCategory::SystemGeneric.is_priority());
    }

    #[test]
    fn test_ride_payload_omits_absent_fields() {
        let ride = RideNotificationData {
            ride_id: "ride-42".to_string(),
            fare: Some(23.5),
            ..Default::default()
        };
        let payload = ride.to_payload();
        assert_eq!(payload.get("rideId"), Some(&json!("ride-42")));
        assert_eq!(payload.get("fare"), Some(&json!(23.5)));
        assert!(!payload.contains_key("passengerName"));
        assert!(!payload.contains_key("pickupLocation"));
    }

    #[test]
    fn test_request_from_ride_carries_payload() {
        let ride = RideNotificationData {
            ride_id: "ride-7".to_string(),
            passenger_name: Some("Ama".to_string()),
            ..Default::default()
        };
        let request = NotificationRequest::from_ride(
            NotificationCategory::RideRequest,
            "New ride request",
            "Pickup 3 min away",
            &ride,
        );
        assert_eq!(request.category, NotificationCategory::RideRequest);
        assert_eq!(request.payload.get("passengerName"), Some(&json!("Ama")));
    }
}
