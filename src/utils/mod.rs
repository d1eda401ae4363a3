// src/utils/mod.rs

pub mod code;
