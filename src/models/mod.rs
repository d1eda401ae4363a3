// src/models/mod.rs

pub mod class;
pub mod quiz;
pub mod result;
