// src/services/token_registry.rs
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing;

use crate::{
    errors::{NotifyError, NotifyResult},
    services::platform::NotificationPort,
    services::storage::{KeyValueStore, StorageKeys},
};

/// Placeholder delivery identity for environments without a real push
/// capability (simulator, missing permission). Deterministic so degraded
/// runs are recognizable in backend logs.
pub const PLACEHOLDER_TOKEN: &str = "simulator-device-token";

/// Supplies the bearer credential for backend calls. Owned by the external
/// auth collaborator; [`StaticAuthToken`] covers wiring and tests.
#[async_trait]
pub trait AuthTokenProvider: Send + Sync {
    async fn bearer_token(&self) -> NotifyResult<String>;
}

pub struct StaticAuthToken(pub String);

#[async_trait]
impl AuthTokenProvider for StaticAuthToken {
    async fn bearer_token(&self) -> NotifyResult<String> {
        Ok(self.0.clone())
    }
}

/// Backend registration collaborator: the push-token handshake endpoints.
#[async_trait]
pub trait DriverApi: Send + Sync {
    async fn register_push_token(&self, token: &str) -> NotifyResult<bool>;
    async fn unregister_push_token(&self, token: &str) -> NotifyResult<bool>;
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub app_version: String,
    pub platform: String,
    pub environment: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("DRIVER_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::var("DRIVER_PLATFORM").unwrap_or_else(|_| "android".to_string()),
            environment: std::env::var("DRIVER_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }
}

/// HTTP implementation of the backend handshake.
pub struct HttpDriverApi {
    config: BackendConfig,
    client: reqwest::Client,
    auth: Arc<dyn AuthTokenProvider>,
}

impl HttpDriverApi {
    pub fn new(config: BackendConfig, auth: Arc<dyn AuthTokenProvider>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            auth,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/drivers/push-token", self.config.base_url)
    }

    async fn build_request(&self, method: reqwest::Method) -> NotifyResult<reqwest::RequestBuilder> {
        let bearer = self.auth.bearer_token().await?;
        Ok(self
            .client
            .request(method, self.endpoint())
            .header("Authorization", format!("Bearer {}", bearer))
            .header("X-App-Version", &self.config.app_version)
            .header("X-Platform", &self.config.platform)
            .header("X-Environment", &self.config.environment))
    }
}

#[async_trait]
impl DriverApi for HttpDriverApi {
    async fn register_push_token(&self, token: &str) -> NotifyResult<bool> {
        let response = self
            .build_request(reqwest::Method::POST)
            .await?
            .json(&json!({
                "pushToken": token,
                "platform": self.config.platform,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Push token registration rejected ({}): {}", status, body);
            return Ok(false);
        }
        tracing::debug!("Push token registered with backend");
        Ok(true)
    }

    async fn unregister_push_token(&self, token: &str) -> NotifyResult<bool> {
        let response = self
            .build_request(reqwest::Method::DELETE)
            .await?
            .json(&json!({ "pushToken": token }))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!("Push token unregistration rejected: {}", response.status());
            return Ok(false);
        }
        Ok(true)
    }
}

/// Owns the device delivery-identity lifecycle: acquire (with degraded
/// fallback), persist, best-effort backend registration and teardown.
/// Registration is fire-and-forget with no automatic retry; callers that
/// need retry re-invoke `register_with_backend`.
pub struct TokenRegistry {
    store: Arc<dyn KeyValueStore>,
    port: Arc<dyn NotificationPort>,
    api: Arc<dyn DriverApi>,
}

impl TokenRegistry {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        port: Arc<dyn NotificationPort>,
        api: Arc<dyn DriverApi>,
    ) -> Self {
        Self { store, port, api }
    }

    /// Request a delivery identity from the platform; on a non-capable
    /// environment fall back to the deterministic placeholder so the rest
    /// of the system continues in log-only mode. Never fails.
    pub async fn acquire(&self) -> String {
        match self.port.get_delivery_token().await {
            Ok(token) => token,
            Err(NotifyError::DeliveryUnavailable(reason)) => {
                tracing::info!("No delivery capability ({}), using placeholder token", reason);
                PLACEHOLDER_TOKEN.to_string()
            }
            Err(e) => {
                tracing::warn!("Failed to acquire delivery token ({}), using placeholder", e);
                PLACEHOLDER_TOKEN.to_string()
            }
        }
    }

    pub async fn persist(&self, token: &str) {
        if let Err(e) = self.store.set(StorageKeys::DEVICE_PUSH_TOKEN, token).await {
            tracing::warn!("Failed to persist device token: {}", e);
        }
    }

    pub async fn load(&self) -> Option<String> {
        match self.store.get(StorageKeys::DEVICE_PUSH_TOKEN).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to load device token: {}", e);
                None
            }
        }
    }

    /// Remove the persisted token (teardown symmetry with `persist`).
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(StorageKeys::DEVICE_PUSH_TOKEN).await {
            tracing::warn!("Failed to clear device token: {}", e);
        }
    }

    /// Best-effort handshake; false on any failure, never an error.
    pub async fn register_with_backend(&self, token: &str) -> bool {
        match self.api.register_push_token(token).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Push token registration failed: {}", e);
                false
            }
        }
    }

    pub async fn unregister(&self, token: &str) -> bool {
        match self.api.unregister_push_token(token).await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Push token unregistration failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::platform::LogOnlyPort;
    use crate::services::storage::MemoryStore;

    /// Scripted backend: behaves like an HTTP 500 (soft failure) or a
    /// transport error depending on the flag.
    struct ScriptedApi {
        server_error: bool,
        transport_error: bool,
    }

    #[async_trait]
    impl DriverApi for ScriptedApi {
        async fn register_push_token(&self, _token: &str) -> NotifyResult<bool> {
            if self.transport_error {
                return Err(NotifyError::NetworkConnection("refused".to_string()));
            }
            Ok(!self.server_error)
        }
        async fn unregister_push_token(&self, _token: &str) -> NotifyResult<bool> {
            Ok(!self.server_error)
        }
    }

    fn registry(api: ScriptedApi) -> (Arc<MemoryStore>, TokenRegistry) {
        let kv = Arc::new(MemoryStore::new());
        let registry = TokenRegistry::new(
            kv.clone() as Arc<dyn KeyValueStore>,
            Arc::new(LogOnlyPort),
            Arc::new(api),
        );
        (kv, registry)
    }

    #[tokio::test]
    async fn test_acquire_falls_back_to_placeholder() {
        let (_kv, registry) = registry(ScriptedApi {
            server_error: false,
            transport_error: false,
        });
        // LogOnlyPort has no delivery capability
        assert_eq!(registry.acquire().await, PLACEHOLDER_TOKEN);
    }

    #[tokio::test]
    async fn test_persist_load_clear_round_trip() {
        let (_kv, registry) = registry(ScriptedApi {
            server_error: false,
            transport_error: false,
        });
        assert_eq!(registry.load().await, None);

        registry.persist("tok-abc").await;
        assert_eq!(registry.load().await, Some("tok-abc".to_string()));

        registry.clear().await;
        assert_eq!(registry.load().await, None);
    }

    #[tokio::test]
    async fn test_server_error_returns_false_and_keeps_persisted_token() {
        let (_kv, registry) = registry(ScriptedApi {
            server_error: true,
            transport_error: false,
        });
        registry.persist("tok-abc").await;

        assert!(!registry.register_with_backend("tok-abc").await);
        // Token stays persisted for a later retry by the caller
        assert_eq!(registry.load().await, Some("tok-abc".to_string()));
    }

    #[tokio::test]
    async fn test_transport_error_is_soft_failure() {
        let (_kv, registry) = registry(ScriptedApi {
            server_error: false,
            transport_error: true,
        });
        assert!(!registry.register_with_backend("tok-abc").await);
    }

    #[tokio::test]
    async fn test_successful_handshake() {
        let (_kv, registry) = registry(ScriptedApi {
            server_error: false,
            transport_error: false,
        });
        assert!(registry.register_with_backend("tok-abc").await);
        assert!(registry.unregister("tok-abc").await);
    }
}
