pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use errors::{NotifyError, NotifyResult};
pub use models::notification::{
    Channel, ChannelSpec, Importance, NotificationCategory, NotificationRequest,
    RideNotificationData, ScheduleTrigger,
};
pub use models::settings::{NotificationSettings, SettingsPatch};
pub use state::{EngineState, NotifyEngine};
