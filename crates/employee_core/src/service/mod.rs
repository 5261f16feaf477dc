//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing APIs.
//! - Keep callers decoupled from storage details.

pub mod employee_service;
