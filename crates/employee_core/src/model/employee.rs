//! Employee domain model and schema validation.
//!
//! # Responsibility
//! - Define the persisted `Employee` record and its field set.
//! - Validate untyped candidates before they reach storage.
//!
//! # Invariants
//! - `firstName`, `lastName` and `department` are required, non-empty strings.
//! - Validation inspects every field and reports all issues at once.
//! - Non-string values are rejected, never stringified.
//! - Values are kept verbatim; no case or whitespace normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to an employee record on creation.
pub type EmployeeId = Uuid;

/// Schema fields of an employee record, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmployeeField {
    FirstName,
    LastName,
    Department,
}

impl EmployeeField {
    /// All schema fields in the order they are validated and reported.
    pub const ALL: [EmployeeField; 3] = [Self::FirstName, Self::LastName, Self::Department];

    /// Document key used for this field.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Department => "department",
        }
    }

    /// Resolves a document key back to its schema field.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.wire_name() == name)
    }
}

impl Display for EmployeeField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Why a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Field absent or `null`.
    Missing,
    /// Field present but an empty string.
    Empty,
    /// Field holds a non-string JSON value; `found` names its JSON type.
    NotAString { found: &'static str },
}

/// One offending field in a validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: EmployeeField,
    pub kind: IssueKind,
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            IssueKind::Missing => write!(f, "`{}` is required", self.field),
            IssueKind::Empty => write!(f, "`{}` must not be empty", self.field),
            IssueKind::NotAString { found } => {
                write!(f, "`{}` must be a string, found {found}", self.field)
            }
        }
    }
}

/// Structured validation failure naming every offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeValidationError {
    issues: Vec<FieldIssue>,
}

impl EmployeeValidationError {
    pub(crate) fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// Issues in schema field order.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Offending fields in schema order.
    pub fn fields(&self) -> Vec<EmployeeField> {
        self.issues.iter().map(|issue| issue.field).collect()
    }

    /// Returns the issue reported for `field`, if any.
    pub fn issue_for(&self, field: EmployeeField) -> Option<&FieldIssue> {
        self.issues.iter().find(|issue| issue.field == field)
    }
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("employee validation failed: ")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl Error for EmployeeValidationError {}

/// Unvalidated, not-yet-persisted employee input.
///
/// Holds raw JSON values so that wrong-typed input (objects, arrays, numbers)
/// can be reported instead of being rejected at deserialization time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    fields: Map<String, Value>,
}

impl Candidate {
    /// Creates an empty candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a candidate from the three schema fields.
    pub fn from_parts(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self::new()
            .with(EmployeeField::FirstName.wire_name(), Value::String(first_name.into()))
            .with(EmployeeField::LastName.wire_name(), Value::String(last_name.into()))
            .with(EmployeeField::Department.wire_name(), Value::String(department.into()))
    }

    /// Builds a candidate from an arbitrary JSON value.
    ///
    /// A non-object value carries no fields, so it validates as all-missing.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    /// Sets one raw field value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Checks every schema field; see [`validate`].
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        validate(self)
    }

    /// Document body limited to schema fields.
    ///
    /// Keys outside the schema are dropped, so they never reach storage.
    pub fn schema_document(&self) -> Map<String, Value> {
        EmployeeField::ALL
            .into_iter()
            .filter_map(|field| {
                self.fields
                    .get(field.wire_name())
                    .map(|value| (field.wire_name().to_string(), value.clone()))
            })
            .collect()
    }
}

impl From<Map<String, Value>> for Candidate {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Validates a candidate against the employee schema.
///
/// Never panics. Partial or empty input yields an error listing every missing
/// field; non-string values are reported with their JSON type.
pub fn validate(candidate: &Candidate) -> Result<(), EmployeeValidationError> {
    let issues: Vec<FieldIssue> = EmployeeField::ALL
        .into_iter()
        .filter_map(|field| check_field(field, candidate.get(field.wire_name())))
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(EmployeeValidationError::new(issues))
    }
}

/// Checks a single raw value for `field`.
pub(crate) fn check_field(field: EmployeeField, value: Option<&Value>) -> Option<FieldIssue> {
    let kind = match value {
        None | Some(Value::Null) => IssueKind::Missing,
        Some(Value::String(text)) if text.is_empty() => IssueKind::Empty,
        Some(Value::String(_)) => return None,
        Some(other) => IssueKind::NotAString {
            found: json_kind(other),
        },
    };
    Some(FieldIssue { field, kind })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Persisted employee record.
///
/// Serialized with the document field names (`_id`, `firstName`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Identity assigned by storage on creation.
    #[serde(rename = "_id")]
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
}

impl Employee {
    /// Decodes a stored document body into a typed record.
    ///
    /// # Errors
    /// - Returns every schema violation found in `body`.
    pub fn from_document(
        id: EmployeeId,
        body: &Map<String, Value>,
    ) -> Result<Self, EmployeeValidationError> {
        let candidate = Candidate::from(body.clone());
        candidate.validate()?;

        let text = |field: EmployeeField| {
            body.get(field.wire_name())
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Ok(Self {
            id,
            first_name: text(EmployeeField::FirstName),
            last_name: text(EmployeeField::LastName),
            department: text(EmployeeField::Department),
        })
    }

    /// Document body for this record, without the identity key.
    pub fn document(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert(
            EmployeeField::FirstName.wire_name().to_string(),
            Value::String(self.first_name.clone()),
        );
        body.insert(
            EmployeeField::LastName.wire_name().to_string(),
            Value::String(self.last_name.clone()),
        );
        body.insert(
            EmployeeField::Department.wire_name().to_string(),
            Value::String(self.department.clone()),
        );
        body
    }

    /// Re-checks the record's fields, e.g. after in-place mutation.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        validate(&Candidate::from(self.document()))
    }
}
