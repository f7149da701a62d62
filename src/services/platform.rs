// src/services/platform.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing;

use crate::{
    errors::{NotifyError, NotifyResult},
    models::notification::{ChannelSpec, Importance, ScheduleTrigger},
};

/// Content handed to the platform for rendering. The engine never renders
/// anything itself; payload is forwarded verbatim for tap handling.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub payload: Map<String, Value>,
    pub sound: bool,
    pub importance: Importance,
}

/// The platform notification collaborator (consumed, not implemented, by
/// this engine). A real implementation wraps the OS notification APIs;
/// [`LogOnlyPort`] stands in on non-capable environments.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn request_permission(&self) -> NotifyResult<bool>;
    /// Mint the device's delivery-identity token.
    async fn get_delivery_token(&self) -> NotifyResult<String>;
    async fn dispatch_now(&self, content: NotificationContent) -> NotifyResult<()>;
    /// Returns the platform's native schedule id.
    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: ScheduleTrigger,
    ) -> NotifyResult<String>;
    async fn cancel(&self, native_id: &str) -> NotifyResult<()>;
    async fn cancel_all(&self) -> NotifyResult<()>;
    async fn get_badge_count(&self) -> NotifyResult<u32>;
    async fn set_badge_count(&self, count: u32) -> NotifyResult<()>;
    async fn dismiss_all(&self) -> NotifyResult<()>;
    async fn register_channel(&self, spec: &ChannelSpec) -> NotifyResult<()>;
}

/// Degraded-mode port for simulators, tests and headless runs: every call is
/// a log line. Token minting fails so the registry falls back to its
/// deterministic placeholder.
#[derive(Debug, Default)]
pub struct LogOnlyPort;

#[async_trait]
impl NotificationPort for LogOnlyPort {
    async fn request_permission(&self) -> NotifyResult<bool> {
        tracing::info!("[LOG-ONLY] Would request notification permission");
        Ok(true)
    }

    async fn get_delivery_token(&self) -> NotifyResult<String> {
        Err(NotifyError::delivery_unavailable(
            "log-only port has no delivery identity",
        ))
    }

    async fn dispatch_now(&self, content: NotificationContent) -> NotifyResult<()> {
        tracing::info!(
            "[LOG-ONLY] Would dispatch: {} - {} (sound: {}, importance: {:?})",
            content.title,
            content.body,
            content.sound,
            content.importance
        );
        Ok(())
    }

    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: ScheduleTrigger,
    ) -> NotifyResult<String> {
        tracing::info!(
            "[LOG-ONLY] Would schedule: {} for {:?}",
            content.title,
            trigger
        );
        Ok(format!("log-only-{}", content.title.len()))
    }

    async fn cancel(&self, native_id: &str) -> NotifyResult<()> {
        tracing::info!("[LOG-ONLY] Would cancel schedule: {}", native_id);
        Ok(())
    }

    async fn cancel_all(&self) -> NotifyResult<()> {
        tracing::info!("[LOG-ONLY] Would cancel all schedules");
        Ok(())
    }

    async fn get_badge_count(&self) -> NotifyResult<u32> {
        Ok(0)
    }

    async fn set_badge_count(&self, count: u32) -> NotifyResult<()> {
        tracing::info!("[LOG-ONLY] Would set badge count to {}", count);
        Ok(())
    }

    async fn dismiss_all(&self) -> NotifyResult<()> {
        tracing::info!("[LOG-ONLY] Would dismiss all delivered notifications");
        Ok(())
    }

    async fn register_channel(&self, spec: &ChannelSpec) -> NotifyResult<()> {
        tracing::info!(
            "[LOG-ONLY] Would register channel {} ({:?})",
            spec.id,
            spec.importance
        );
        Ok(())
    }
}
