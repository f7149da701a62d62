// src/services/mod.rs
pub mod channels;
pub mod platform;
pub mod policy;
pub mod scheduler;
pub mod settings_store;
pub mod storage;
pub mod token_registry;
