// src/services/settings_store.rs
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing;

use crate::{
    errors::NotifyResult,
    models::settings::{NotificationSettings, SettingsPatch},
    services::storage::{KeyValueStore, StorageKeys},
};

/// Durable notification settings with defaults-merge semantics.
///
/// The in-memory record is authoritative for the life of the engine; every
/// mutator writes through to storage before returning. Storage failures
/// never surface to callers: the in-memory record still advances and the
/// failure is logged, so a flaky durable layer degrades to session-scoped
/// settings instead of breaking the app.
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<NotificationSettings>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            current: RwLock::new(NotificationSettings::default()),
        }
    }

    /// Load the persisted record, merging a partial one over defaults.
    ///
    /// Absent record: defaults are written back. Partial record: merged and
    /// re-persisted. Complete record: used as-is, no rewrite. Corrupt JSON or
    /// a storage read failure falls back to in-memory defaults; subsequent
    /// calls operate on that fallback.
    pub async fn initialize(&self) -> NotificationSettings {
        let merged = match self.store.get(StorageKeys::NOTIFICATION_SETTINGS).await {
            Ok(Some(raw)) => match serde_json::from_str::<SettingsPatch>(&raw) {
                Ok(patch) => {
                    let mut settings = NotificationSettings::default();
                    patch.apply_to(&mut settings);
                    if !patch.is_complete() {
                        tracing::info!("Stored notification settings were partial, re-persisting merged record");
                        self.persist(&settings).await;
                    }
                    settings
                }
                Err(e) => {
                    tracing::warn!("Corrupt notification settings record, falling back to defaults: {}", e);
                    NotificationSettings::default()
                }
            },
            Ok(None) => {
                tracing::info!("No notification settings found, writing defaults");
                let settings = NotificationSettings::default();
                self.persist(&settings).await;
                settings
            }
            Err(e) => {
                tracing::warn!("Failed to read notification settings, falling back to defaults: {}", e);
                NotificationSettings::default()
            }
        };

        let mut current = self.current.write().await;
        *current = merged.clone();
        merged
    }

    /// Immutable snapshot of the current record.
    pub async fn get_settings(&self) -> NotificationSettings {
        self.current.read().await.clone()
    }

    /// Apply a single-field change (a patch with one field set) and persist.
    pub async fn update_setting(&self, patch: SettingsPatch) {
        self.update_settings(patch).await;
    }

    /// Shallow-merge a partial record and persist before returning.
    pub async fn update_settings(&self, patch: SettingsPatch) {
        let updated = {
            let mut current = self.current.write().await;
            patch.apply_to(&mut current);
            current.clone()
        };
        self.persist(&updated).await;
    }

    /// Replace the whole record with defaults and persist.
    pub async fn reset_to_defaults(&self) {
        let defaults = NotificationSettings::default();
        {
            let mut current = self.current.write().await;
            *current = defaults.clone();
        }
        self.persist(&defaults).await;
    }

    async fn persist(&self, settings: &NotificationSettings) {
        if let Err(e) = self.try_persist(settings).await {
            tracing::warn!("Failed to persist notification settings: {}", e);
        }
    }

    async fn try_persist(&self, settings: &NotificationSettings) -> NotifyResult<()> {
        let json = serde_json::to_string(settings)?;
        self.store.set(StorageKeys::NOTIFICATION_SETTINGS, &json).await
    }
}
