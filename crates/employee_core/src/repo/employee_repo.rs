//! Employee repository contract and document-backed implementation.
//!
//! # Responsibility
//! - Provide create/find/update/delete/save APIs over employee documents.
//! - Keep the collection collaborator behind a trait seam.
//!
//! # Invariants
//! - Candidates, filters and updates are validated before any collection call.
//! - Read paths reject invalid stored documents instead of masking them.
//! - Collection failures propagate unchanged as `RepoError::Storage`.

use crate::config::{StoreConfig, UpdateValidation};
use crate::document::{
    DocumentCollection, Filter, QueryError, StorageError, StoredDocument, Update, UpdateOutcome,
};
use crate::model::employee::{
    check_field, Candidate, Employee, EmployeeField, EmployeeId, EmployeeValidationError,
    FieldIssue,
};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by employee repository operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EmployeeValidationError),
    InvalidQuery(QueryError),
    Storage(StorageError),
    NotFound(EmployeeId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidQuery(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "employee not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored employee data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidQuery(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::InvalidQuery(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Repository interface for employee records.
pub trait EmployeeRepository {
    /// Validates and persists a candidate, returning the stored record.
    fn create(&self, candidate: &Candidate) -> RepoResult<Employee>;
    /// All records in storage order.
    fn find_all(&self) -> RepoResult<Vec<Employee>>;
    /// Records matching `filter` in storage order.
    fn find(&self, filter: &Filter) -> RepoResult<Vec<Employee>>;
    /// First record matching `filter`; `None` when nothing matches.
    fn find_one(&self, filter: &Filter) -> RepoResult<Option<Employee>>;
    fn update_one(&self, filter: &Filter, update: &Update) -> RepoResult<UpdateOutcome>;
    fn update_many(&self, filter: &Filter, update: &Update) -> RepoResult<UpdateOutcome>;
    /// Removes the first match; returns the removed count (0 or 1).
    fn delete_one(&self, filter: &Filter) -> RepoResult<u64>;
    /// Removes every match; returns the removed count.
    fn delete_many(&self, filter: &Filter) -> RepoResult<u64>;
    /// Overwrites the stored record with the same id.
    fn save(&self, employee: &Employee) -> RepoResult<()>;
    /// Deletes a previously fetched record; `false` when already gone.
    fn remove(&self, employee: &Employee) -> RepoResult<bool>;
}

/// Employee repository over any document collection.
pub struct EmployeeStore<C> {
    collection: C,
    update_validation: UpdateValidation,
}

impl<C: DocumentCollection> EmployeeStore<C> {
    /// Creates a store with the default update validation.
    pub fn new(collection: C) -> Self {
        Self {
            collection,
            update_validation: UpdateValidation::default(),
        }
    }

    /// Creates a store using the update policy from `config`.
    pub fn with_config(collection: C, config: &StoreConfig) -> Self {
        Self::new(collection).with_update_validation(config.update_validation)
    }

    pub fn with_update_validation(mut self, update_validation: UpdateValidation) -> Self {
        self.update_validation = update_validation;
        self
    }

    pub fn update_validation(&self) -> UpdateValidation {
        self.update_validation
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    fn prepare_update(&self, update: &Update) -> RepoResult<Update> {
        update.check()?;

        if self.update_validation == UpdateValidation::PassThrough {
            return Ok(update.clone());
        }

        let issues: Vec<FieldIssue> = EmployeeField::ALL
            .into_iter()
            .filter_map(|field| {
                let value = update.assignments().get(field.wire_name())?;
                check_field(field, Some(value))
            })
            .collect();

        if !issues.is_empty() {
            let err = EmployeeValidationError::new(issues);
            warn!(
                "event=employee_update module=repo status=rejected fields={}",
                field_list(&err)
            );
            return Err(err.into());
        }

        if self.update_validation == UpdateValidation::Strict {
            if let Some(field) = update
                .assignments()
                .keys()
                .find(|field| EmployeeField::from_wire(field).is_none())
            {
                return Err(QueryError::new(format!("unknown employee field `{field}`")).into());
            }
        }

        Ok(update.retain_fields(|field| EmployeeField::from_wire(field).is_some()))
    }
}

impl<C: DocumentCollection> EmployeeRepository for EmployeeStore<C> {
    fn create(&self, candidate: &Candidate) -> RepoResult<Employee> {
        if let Err(err) = candidate.validate() {
            debug!(
                "event=employee_create module=repo status=rejected fields={}",
                field_list(&err)
            );
            return Err(err.into());
        }

        let body = candidate.schema_document();
        let id = self.collection.insert_one(&body)?;
        let employee = Employee::from_document(id, &body)?;

        debug!("event=employee_create module=repo status=ok id={id}");
        Ok(employee)
    }

    fn find_all(&self) -> RepoResult<Vec<Employee>> {
        self.find(&Filter::all())
    }

    fn find(&self, filter: &Filter) -> RepoResult<Vec<Employee>> {
        filter.check()?;
        self.collection
            .find_many(filter)?
            .into_iter()
            .map(decode_employee)
            .collect()
    }

    fn find_one(&self, filter: &Filter) -> RepoResult<Option<Employee>> {
        filter.check()?;
        self.collection
            .find_one(filter)?
            .map(decode_employee)
            .transpose()
    }

    fn update_one(&self, filter: &Filter, update: &Update) -> RepoResult<UpdateOutcome> {
        filter.check()?;
        let update = self.prepare_update(update)?;
        Ok(self.collection.update_one(filter, &update)?)
    }

    fn update_many(&self, filter: &Filter, update: &Update) -> RepoResult<UpdateOutcome> {
        filter.check()?;
        let update = self.prepare_update(update)?;
        Ok(self.collection.update_many(filter, &update)?)
    }

    fn delete_one(&self, filter: &Filter) -> RepoResult<u64> {
        filter.check()?;
        Ok(self.collection.delete_one(filter)?)
    }

    fn delete_many(&self, filter: &Filter) -> RepoResult<u64> {
        filter.check()?;
        Ok(self.collection.delete_many(filter)?)
    }

    fn save(&self, employee: &Employee) -> RepoResult<()> {
        employee.validate()?;

        if !self
            .collection
            .replace_one(employee.id, &employee.document())?
        {
            return Err(RepoError::NotFound(employee.id));
        }

        debug!("event=employee_save module=repo status=ok id={}", employee.id);
        Ok(())
    }

    fn remove(&self, employee: &Employee) -> RepoResult<bool> {
        let removed = self.collection.delete_one(&Filter::by_id(employee.id))?;
        Ok(removed > 0)
    }
}

fn decode_employee(document: StoredDocument) -> RepoResult<Employee> {
    if document.id.is_nil() {
        return Err(RepoError::InvalidData(
            "stored document has nil id".to_string(),
        ));
    }

    Employee::from_document(document.id, &document.body).map_err(|err| {
        warn!(
            "event=employee_decode module=repo status=error id={} fields={}",
            document.id,
            field_list(&err)
        );
        RepoError::InvalidData(format!("document {}: {err}", document.id))
    })
}

fn field_list(err: &EmployeeValidationError) -> String {
    err.fields()
        .iter()
        .map(|field| field.wire_name())
        .collect::<Vec<_>>()
        .join(",")
}
