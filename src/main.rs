use std::sync::Arc;

use driver_notify::{
    NotificationCategory, NotificationRequest, RideNotificationData,
    services::platform::LogOnlyPort,
    services::storage::MemoryStore,
    services::token_registry::{BackendConfig, HttpDriverApi, StaticAuthToken},
    state::NotifyEngine,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = Arc::new(MemoryStore::new());
    let port = Arc::new(LogOnlyPort);
    let api = Arc::new(HttpDriverApi::new(
        BackendConfig::default(),
        Arc::new(StaticAuthToken(
            std::env::var("DRIVER_AUTH_TOKEN").unwrap_or_else(|_| "dev-token".to_string()),
        )),
    ));

    let engine = NotifyEngine::new(store, port, api);
    engine.initialize().await;

    let ride = RideNotificationData {
        ride_id: "ride-demo-1".to_string(),
        pickup_location: Some("Osu, Accra".to_string()),
        dropoff_location: Some("East Legon".to_string()),
        fare: Some(35.0),
        passenger_name: Some("Ama".to_string()),
        estimated_time: Some("4 min".to_string()),
        distance: Some("1.2 km".to_string()),
    };
    engine
        .send_now(NotificationRequest::from_ride(
            NotificationCategory::RideRequest,
            "New ride request",
            "Pickup at Osu, 4 min away - GHS 35.00",
            &ride,
        ))
        .await;

    engine.dispose().await;
}
