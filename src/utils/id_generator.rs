// src/utils/id_generator.rs
use chrono::{DateTime, Utc};

/// Opaque handle ids for deferred notifications: `ntf-{YYMMDD}-{suffix}`.
///
/// Handles are minted per `schedule_at` call and never reused; the date part
/// makes stale handles easy to spot in logs.
pub struct HandleIdGenerator;

const HANDLE_PREFIX: &str = "ntf";
const SUFFIX_LEN: usize = 8;

impl HandleIdGenerator {
    pub fn generate() -> String {
        Self::generate_with_timestamp(Utc::now())
    }

    /// Generate with a specific timestamp (useful for testing).
    pub fn generate_with_timestamp(timestamp: DateTime<Utc>) -> String {
        let date_part = timestamp.format("%y%m%d").to_string();
        format!("{}-{}-{}", HANDLE_PREFIX, date_part, Self::generate_suffix())
    }

    fn generate_suffix() -> String {
        use rand::Rng;

        const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::rng();
        (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..CHARS.len());
                CHARS[idx] as char
            })
            .collect()
    }

    /// Shallow format check, used only for log hygiene when cancelling.
    pub fn looks_valid(id: &str) -> bool {
        let parts: Vec<&str> = id.split('-').collect();
        parts.len() == 3
            && parts[0] == HANDLE_PREFIX
            && parts[1].len() == 6
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && parts[2].len() == SUFFIX_LEN
    }
}
