//! Employee use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for core callers.
//! - Translate convenient inputs (parts, JSON) into repository calls.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Service layer remains storage-agnostic.

use crate::document::{Filter, Update, UpdateOutcome};
use crate::model::employee::{Candidate, Employee, EmployeeField, EmployeeValidationError};
use crate::repo::employee_repo::{EmployeeRepository, RepoResult};
use serde_json::Value;

/// Use-case wrapper around an employee repository.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Checks raw input without touching storage.
    pub fn validate(&self, input: Value) -> Result<(), EmployeeValidationError> {
        Candidate::from_value(input).validate()
    }

    /// Creates a record from the three schema fields.
    pub fn hire(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        department: impl Into<String>,
    ) -> RepoResult<Employee> {
        self.repo.create(&Candidate::from_parts(first_name, last_name, department))
    }

    /// Creates a record from raw JSON input.
    pub fn create_from_json(&self, input: Value) -> RepoResult<Employee> {
        self.repo.create(&Candidate::from_value(input))
    }

    pub fn create(&self, candidate: &Candidate) -> RepoResult<Employee> {
        self.repo.create(candidate)
    }

    pub fn list(&self) -> RepoResult<Vec<Employee>> {
        self.repo.find_all()
    }

    pub fn find(&self, filter: &Filter) -> RepoResult<Vec<Employee>> {
        self.repo.find(filter)
    }

    pub fn find_one(&self, filter: &Filter) -> RepoResult<Option<Employee>> {
        self.repo.find_one(filter)
    }

    /// Records whose department equals `department` exactly.
    pub fn in_department(&self, department: &str) -> RepoResult<Vec<Employee>> {
        self.repo.find(&Filter::all().eq(EmployeeField::Department.wire_name(), department))
    }

    /// Number of stored records.
    pub fn count(&self) -> RepoResult<usize> {
        Ok(self.repo.find_all()?.len())
    }

    pub fn update_one(&self, filter: &Filter, update: &Update) -> RepoResult<UpdateOutcome> {
        self.repo.update_one(filter, update)
    }

    pub fn update_many(&self, filter: &Filter, update: &Update) -> RepoResult<UpdateOutcome> {
        self.repo.update_many(filter, update)
    }

    pub fn delete_one(&self, filter: &Filter) -> RepoResult<u64> {
        self.repo.delete_one(filter)
    }

    pub fn delete_many(&self, filter: &Filter) -> RepoResult<u64> {
        self.repo.delete_many(filter)
    }

    /// Persists in-place changes made to a fetched record.
    pub fn save(&self, employee: &Employee) -> RepoResult<()> {
        self.repo.save(employee)
    }

    pub fn remove(&self, employee: &Employee) -> RepoResult<bool> {
        self.repo.remove(employee)
    }
}
