// src/state.rs
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing;

use crate::{
    models::notification::{NotificationRequest, ScheduleTrigger},
    models::settings::{NotificationSettings, SettingsPatch},
    services::channels::ChannelClassifier,
    services::platform::NotificationPort,
    services::policy::{Clock, PolicyResolver, SystemClock},
    services::scheduler::NotificationScheduler,
    services::settings_store::SettingsStore,
    services::storage::KeyValueStore,
    services::token_registry::{DriverApi, TokenRegistry},
};

/// Engine lifecycle. `Disposed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

/// The notification engine: one explicitly constructed instance per process,
/// passed by reference to every consumer. No hidden static accessor.
pub struct NotifyEngine {
    settings: Arc<SettingsStore>,
    scheduler: NotificationScheduler,
    tokens: TokenRegistry,
    port: Arc<dyn NotificationPort>,
    state: RwLock<EngineState>,
}

impl NotifyEngine {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        port: Arc<dyn NotificationPort>,
        api: Arc<dyn DriverApi>,
    ) -> Self {
        Self::with_clock(store, port, api, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        port: Arc<dyn NotificationPort>,
        api: Arc<dyn DriverApi>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let settings = Arc::new(SettingsStore::new(store.clone()));
        let policy = Arc::new(PolicyResolver::new(settings.clone(), clock));
        let scheduler = NotificationScheduler::new(policy, port.clone());
        let tokens = TokenRegistry::new(store, port.clone(), api);
        Self {
            settings,
            scheduler,
            tokens,
            port,
            state: RwLock::new(EngineState::Uninitialized),
        }
    }

    pub async fn state(&self) -> EngineState {
        *self.state.read().await
    }

    /// Bring the engine to `Ready`.
    ///
    /// Settings initialization and the token handshake run concurrently;
    /// readiness is gated on settings only — a failed token acquisition or
    /// registration leaves the engine fully usable in degraded delivery
    /// mode. Idempotent: calling again on a ready engine is a no-op.
    pub async fn initialize(&self) {
        {
            let mut state = self.state.write().await;
            match *state {
                EngineState::Uninitialized => *state = EngineState::Initializing,
                EngineState::Disposed => {
                    tracing::warn!("initialize() called on a disposed engine");
                    return;
                }
                _ => {
                    tracing::info!("Engine already initialized, skipping");
                    return;
                }
            }
        }

        let settings_init = self.settings.initialize();
        let token_handshake = async {
            let token = self.tokens.acquire().await;
            self.tokens.persist(&token).await;
            if !self.tokens.register_with_backend(&token).await {
                tracing::warn!("Push token registration failed, continuing without it");
            }
        };
        let channel_registration = async {
            for spec in ChannelClassifier::all_channel_specs() {
                if let Err(e) = self.port.register_channel(&spec).await {
                    tracing::warn!("Failed to register channel {}: {}", spec.id, e);
                }
            }
        };
        let _ = tokio::join!(settings_init, token_handshake, channel_registration);

        let mut state = self.state.write().await;
        // dispose() may have raced us; Disposed stays terminal
        if *state == EngineState::Initializing {
            *state = EngineState::Ready;
            tracing::info!("Notification engine ready");
        }
    }

    /// Terminal teardown: drops all deferred-notification tracking.
    pub async fn dispose(&self) {
        {
            let mut state = self.state.write().await;
            if *state == EngineState::Disposed {
                return;
            }
            *state = EngineState::Disposed;
        }
        self.scheduler.cancel_all().await;
        tracing::info!("Notification engine disposed");
    }

    async fn is_disposed(&self) -> bool {
        if *self.state.read().await == EngineState::Disposed {
            tracing::warn!("Engine call after dispose(), ignoring");
            return true;
        }
        false
    }

    // --- delivery ---

    pub async fn send_now(&self, request: NotificationRequest) {
        if self.is_disposed().await {
            return;
        }
        self.scheduler.send_now(request).await;
    }

    pub async fn schedule_at(&self, request: NotificationRequest, trigger: ScheduleTrigger) -> String {
        if self.is_disposed().await {
            return crate::utils::id_generator::HandleIdGenerator::generate();
        }
        self.scheduler.schedule_at(request, trigger).await
    }

    pub async fn cancel(&self, handle: &str) {
        if self.is_disposed().await {
            return;
        }
        self.scheduler.cancel(handle).await;
    }

    pub async fn cancel_all(&self) {
        self.scheduler.cancel_all().await;
    }

    pub async fn clear_all_delivered(&self) {
        self.scheduler.clear_all_delivered().await;
    }

    pub async fn get_badge_count(&self) -> u32 {
        self.scheduler.get_badge_count().await
    }

    pub async fn set_badge_count(&self, count: u32) {
        self.scheduler.set_badge_count(count).await;
    }

    // --- settings ---

    pub async fn get_settings(&self) -> NotificationSettings {
        self.settings.get_settings().await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) {
        if self.is_disposed().await {
            return;
        }
        self.settings.update_settings(patch).await;
    }

    pub async fn reset_settings(&self) {
        if self.is_disposed().await {
            return;
        }
        self.settings.reset_to_defaults().await;
    }

    // --- token ---

    pub async fn device_token(&self) -> Option<String> {
        self.tokens.load().await
    }

    /// Re-run the best-effort backend handshake with the persisted token.
    pub async fn register_push_token(&self) -> bool {
        if self.is_disposed().await {
            return false;
        }
        match self.tokens.load().await {
            Some(token) => self.tokens.register_with_backend(&token).await,
            None => {
                tracing::warn!("No persisted device token to register");
                false
            }
        }
    }

    /// Unregister the persisted token and clear it locally.
    pub async fn unregister_push_token(&self) -> bool {
        match self.tokens.load().await {
            Some(token) => {
                let ok = self.tokens.unregister(&token).await;
                self.tokens.clear().await;
                ok
            }
            None => false,
        }
    }
}
