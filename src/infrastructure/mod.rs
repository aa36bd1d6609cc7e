//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: key-value storage (in-memory or SQLite)
//! - Monster catalog: HTTP client for the remote stat-block list
//! - Export: JSON import/export and plain-text sheets
//! - HTTP: REST API routes
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod export;
pub mod http;
pub mod monster_catalog;
pub mod persistence;
pub mod state;
