// src/models/mod.rs
pub mod notification;
pub mod settings;

pub use notification::*;
pub use settings::*;
