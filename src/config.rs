// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Which collaborator implementations the application is wired with.
/// Chosen once at startup; replaces any runtime "offline mode" flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub bind_address: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok();

        let storage_backend = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("postgres") => StorageBackend::Postgres,
            Ok(other) => panic!("Unknown STORAGE_BACKEND '{}'", other),
            // Default follows the environment: a configured database means
            // Postgres, otherwise run fully in memory.
            Err(_) => {
                if database_url.is_some() {
                    StorageBackend::Postgres
                } else {
                    StorageBackend::Memory
                }
            }
        };

        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            panic!("DATABASE_URL must be set for the postgres backend");
        }

        let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            storage_backend,
            database_url,
            bind_address,
            rust_log,
        }
    }
}
