//! Data Transfer Objects - For API boundaries
//!
//! Request DTOs parse user input leniently; response DTOs carry the derived
//! fields (status, HP percentage) that are never stored.

pub mod character;
pub mod encounter;
pub mod lenient;

pub use character::*;
pub use encounter::*;
