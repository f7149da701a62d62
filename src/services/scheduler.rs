// src/services/scheduler.rs
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing;

use crate::{
    models::notification::{NotificationRequest, ScheduleTrigger},
    services::channels::ChannelClassifier,
    services::platform::{NotificationContent, NotificationPort},
    services::policy::PolicyResolver,
    utils::id_generator::HandleIdGenerator,
};

/// Policy-gated dispatch and deferral on top of the platform port.
///
/// Everything here is best-effort UX: a port failure is logged and swallowed,
/// never surfaced to the caller's primary workflow. Deferred notifications
/// are tracked as handle id -> native platform id so cancellation stays
/// idempotent across unknown, fired and dead handles.
pub struct NotificationScheduler {
    policy: Arc<PolicyResolver>,
    port: Arc<dyn NotificationPort>,
    pending: RwLock<HashMap<String, String>>,
}

impl NotificationScheduler {
    pub fn new(policy: Arc<PolicyResolver>, port: Arc<dyn NotificationPort>) -> Self {
        Self {
            policy,
            port,
            pending: RwLock::new(HashMap::new()),
        }
    }

    /// Dispatch immediately if policy allows; silent no-op otherwise.
    pub async fn send_now(&self, request: NotificationRequest) {
        if !self.policy.is_enabled(request.category).await {
            tracing::debug!("Notification suppressed by policy: {:?}", request.category);
            return;
        }

        let content = self.build_content(&request).await;
        if let Err(e) = self.port.dispatch_now(content).await {
            tracing::warn!("Failed to dispatch {:?} notification: {}", request.category, e);
        }
    }

    /// Schedule for later delivery, returning an opaque handle id.
    ///
    /// A denied category (and a port failure) still yields a valid handle
    /// with no underlying schedule; callers must not try to distinguish the
    /// cases, and cancelling such a handle is a no-op.
    pub async fn schedule_at(
        &self,
        request: NotificationRequest,
        trigger: ScheduleTrigger,
    ) -> String {
        let handle = HandleIdGenerator::generate();

        if !self.policy.is_enabled(request.category).await {
            tracing::debug!(
                "Deferred notification suppressed by policy: {:?}, returning dead handle {}",
                request.category,
                handle
            );
            return handle;
        }

        let content = self.build_content(&request).await;
        match self.port.schedule(content, trigger).await {
            Ok(native_id) => {
                let mut pending = self.pending.write().await;
                pending.insert(handle.clone(), native_id);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to schedule {:?} notification: {}",
                    request.category,
                    e
                );
            }
        }
        handle
    }

    /// Idempotent cancel: unknown, already-fired and dead handles are no-ops.
    pub async fn cancel(&self, handle: &str) {
        if !HandleIdGenerator::looks_valid(handle) {
            tracing::debug!("Cancel called with foreign handle: {}", handle);
        }

        // Remove the tracking entry before touching the port so an
        // overlapping cancel/fire cannot cancel the same schedule twice.
        let native_id = {
            let mut pending = self.pending.write().await;
            pending.remove(handle)
        };

        if let Some(native_id) = native_id {
            if let Err(e) = self.port.cancel(&native_id).await {
                tracing::warn!("Failed to cancel schedule {}: {}", native_id, e);
            }
        }
    }

    pub async fn cancel_all(&self) {
        {
            let mut pending = self.pending.write().await;
            pending.clear();
        }
        if let Err(e) = self.port.cancel_all().await {
            tracing::warn!("Failed to cancel all schedules: {}", e);
        }
    }

    pub async fn clear_all_delivered(&self) {
        if let Err(e) = self.port.dismiss_all().await {
            tracing::warn!("Failed to dismiss delivered notifications: {}", e);
        }
    }

    /// Pass-through badge read; 0 on port failure.
    pub async fn get_badge_count(&self) -> u32 {
        match self.port.get_badge_count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Failed to read badge count: {}", e);
                0
            }
        }
    }

    pub async fn set_badge_count(&self, count: u32) {
        if let Err(e) = self.port.set_badge_count(count).await {
            tracing::warn!("Failed to set badge count: {}", e);
        }
    }

    /// Number of tracked (live) deferred notifications.
    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    async fn build_content(&self, request: &NotificationRequest) -> NotificationContent {
        let hints = self.policy.resolve_delivery_hints(request.category).await;
        let channel = ChannelClassifier::channel_for(request.category);
        NotificationContent {
            title: request.title.clone(),
            body: request.body.clone(),
            payload: request.payload.clone(),
            sound: hints.sound,
            importance: channel.importance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{NotifyError, NotifyResult};
    use crate::models::notification::{ChannelSpec, Importance, NotificationCategory};
    use crate::models::settings::SettingsPatch;
    use crate::services::policy::{Clock, SystemClock};
    use crate::services::settings_store::SettingsStore;
    use crate::services::storage::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Recording port: captures dispatches and schedules, counts cancels.
    #[derive(Default)]
    struct RecordingPort {
        dispatched: Mutex<Vec<NotificationContent>>,
        scheduled: Mutex<Vec<(String, NotificationContent)>>,
        cancelled: Mutex<Vec<String>>,
        fail_schedule: bool,
    }

    #[async_trait]
    impl NotificationPort for RecordingPort {
        async fn request_permission(&self) -> NotifyResult<bool> {
            Ok(true)
        }
        async fn get_delivery_token(&self) -> NotifyResult<String> {
            Ok("device-token".to_string())
        }
        async fn dispatch_now(&self, content: NotificationContent) -> NotifyResult<()> {
            self.dispatched.lock().unwrap().push(content);
            Ok(())
        }
        async fn schedule(
            &self,
            content: NotificationContent,
            _trigger: ScheduleTrigger,
        ) -> NotifyResult<String> {
            if self.fail_schedule {
                return Err(NotifyError::ScheduleFailed("platform said no".to_string()));
            }
            let native_id = format!("native-{}", self.scheduled.lock().unwrap().len());
            self.scheduled.lock().unwrap().push((native_id.clone(), content));
            Ok(native_id)
        }
        async fn cancel(&self, native_id: &str) -> NotifyResult<()> {
            self.cancelled.lock().unwrap().push(native_id.to_string());
            Ok(())
        }
        async fn cancel_all(&self) -> NotifyResult<()> {
            Ok(())
        }
        async fn get_badge_count(&self) -> NotifyResult<u32> {
            Err(NotifyError::delivery_failed("badge read unavailable"))
        }
        async fn set_badge_count(&self, _count: u32) -> NotifyResult<()> {
            Ok(())
        }
        async fn dismiss_all(&self) -> NotifyResult<()> {
            Ok(())
        }
        async fn register_channel(&self, _spec: &ChannelSpec) -> NotifyResult<()> {
            Ok(())
        }
    }

    async fn scheduler_with(
        patch: SettingsPatch,
        port: Arc<RecordingPort>,
    ) -> NotificationScheduler {
        let kv = Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>;
        let settings = Arc::new(SettingsStore::new(kv));
        settings.initialize().await;
        settings.update_settings(patch).await;
        let clock = Arc::new(SystemClock) as Arc<dyn Clock>;
        let policy = Arc::new(PolicyResolver::new(settings, clock));
        NotificationScheduler::new(policy, port)
    }

    fn ride_request() -> NotificationRequest {
        NotificationRequest::new(NotificationCategory::RideRequest, "New ride", "2 km away")
    }

    #[tokio::test]
    async fn test_send_now_dispatches_with_channel_importance() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;

        scheduler.send_now(ride_request()).await;

        let dispatched = port.dispatched.lock().unwrap();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].importance, Importance::High);
        assert!(dispatched[0].sound);
    }

    #[tokio::test]
    async fn test_send_now_denied_makes_no_port_call() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(
            SettingsPatch {
                notifications_enabled: Some(false),
                ..Default::default()
            },
            port.clone(),
        )
        .await;

        scheduler.send_now(ride_request()).await;
        assert!(port.dispatched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sound_disabled_clears_sound_hint() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(
            SettingsPatch {
                sound_enabled: Some(false),
                ..Default::default()
            },
            port.clone(),
        )
        .await;

        scheduler.send_now(ride_request()).await;
        assert!(!port.dispatched.lock().unwrap()[0].sound);
    }

    #[tokio::test]
    async fn test_schedule_at_returns_distinct_ids_for_identical_calls() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;
        let trigger = ScheduleTrigger::At(Utc::now());

        let a = scheduler.schedule_at(ride_request(), trigger.clone()).await;
        let b = scheduler.schedule_at(ride_request(), trigger).await;

        assert_ne!(a, b);
        assert_eq!(scheduler.pending_count().await, 2);
    }

    #[tokio::test]
    async fn test_schedule_at_denied_returns_dead_handle() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(
            SettingsPatch {
                ride_requests: Some(false),
                ..Default::default()
            },
            port.clone(),
        )
        .await;

        let handle = scheduler
            .schedule_at(ride_request(), ScheduleTrigger::At(Utc::now()))
            .await;

        assert!(HandleIdGenerator::looks_valid(&handle));
        assert!(port.scheduled.lock().unwrap().is_empty());
        assert_eq!(scheduler.pending_count().await, 0);

        // Cancelling the dead handle is a safe no-op
        scheduler.cancel(&handle).await;
        assert!(port.cancelled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_port_failure_yields_dead_handle() {
        let port = Arc::new(RecordingPort {
            fail_schedule: true,
            ..Default::default()
        });
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;

        let handle = scheduler
            .schedule_at(ride_request(), ScheduleTrigger::At(Utc::now()))
            .await;
        assert!(HandleIdGenerator::looks_valid(&handle));
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_cancel_unknown_handle_is_noop() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;

        scheduler.cancel("ntf-260827-zzzzzzzz").await;
        scheduler.cancel("completely-foreign").await;
        assert!(port.cancelled.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_cancels_native_once() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;

        let handle = scheduler
            .schedule_at(ride_request(), ScheduleTrigger::At(Utc::now()))
            .await;
        scheduler.cancel(&handle).await;
        scheduler.cancel(&handle).await;

        assert_eq!(port.cancelled.lock().unwrap().len(), 1);
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_cancel_all_clears_tracking() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;

        scheduler
            .schedule_at(ride_request(), ScheduleTrigger::At(Utc::now()))
            .await;
        scheduler.cancel_all().await;
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_badge_count_read_failure_returns_zero() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;
        assert_eq!(scheduler.get_badge_count().await, 0);
    }

    #[tokio::test]
    async fn test_payload_forwarded_verbatim() {
        let port = Arc::new(RecordingPort::default());
        let scheduler = scheduler_with(SettingsPatch::default(), port.clone()).await;

        let mut payload = serde_json::Map::new();
        payload.insert("rideId".to_string(), serde_json::json!("ride-9"));
        let request = ride_request().with_payload(payload.clone());

        scheduler.send_now(request).await;
        assert_eq!(port.dispatched.lock().unwrap()[0].payload, payload);
    }
}
