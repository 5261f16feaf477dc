//! Employee domain model.
//!
//! # Responsibility
//! - Define the single persisted record type and its schema.
//! - Keep validation pure and independent of storage.

pub mod employee;
