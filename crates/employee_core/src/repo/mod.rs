//! Repository layer over document collections.
//!
//! # Responsibility
//! - Define the employee data-access contract.
//! - Keep collection details out of service orchestration.
//!
//! # Invariants
//! - Writes validate candidates before persistence.
//! - Not-found reads are `None`, not errors.

pub mod employee_repo;
