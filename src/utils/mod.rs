// src/utils/mod.rs
pub mod id_generator;
