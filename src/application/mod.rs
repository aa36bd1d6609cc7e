//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - DTOs: request parsing and response shapes for the HTTP boundary
//! - Ports: storage and monster catalog interfaces
//! - Services: directory, encounter and monster catalog use cases

pub mod dto;
pub mod ports;
pub mod services;
