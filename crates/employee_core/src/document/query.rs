//! Filter and update documents.
//!
//! # Invariants
//! - Filters are plain equality maps; an empty filter selects everything.
//! - Filter fields and object values never carry `$` operators.
//! - Expected `null` also matches an absent field.
//! - Updates only carry `$set` entries and never touch `_id`.

use super::{Document, DocumentId};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Reserved key addressing the document identity.
pub const ID_FIELD: &str = "_id";

const SET_OPERATOR: &str = "$set";

/// Malformed filter or update input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid query: {}", self.message)
    }
}

impl Error for QueryError {}

/// Field-name to expected-value selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    /// Filter matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching a single identity.
    pub fn by_id(id: DocumentId) -> Self {
        Self::all().eq(ID_FIELD, id.to_string())
    }

    /// Adds an equality condition.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &Map<String, Value> {
        &self.conditions
    }

    /// Rejects `$` operator keys, at the top level or inside object values.
    pub fn check(&self) -> Result<(), QueryError> {
        for (field, expected) in &self.conditions {
            if field.starts_with('$') {
                return Err(QueryError::new(format!(
                    "unsupported filter operator `{field}`"
                )));
            }
            if let Value::Object(inner) = expected {
                if let Some(operator) = inner.keys().find(|key| key.starts_with('$')) {
                    return Err(QueryError::new(format!(
                        "unsupported operator `{operator}` on field `{field}`"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Returns whether the document `(id, body)` satisfies every condition.
    pub fn matches(&self, id: DocumentId, body: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            if field == ID_FIELD {
                return expected
                    .as_str()
                    .and_then(|text| Uuid::parse_str(text).ok())
                    .is_some_and(|expected_id| expected_id == id);
            }
            match body.get(field) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            }
        })
    }
}

impl TryFrom<Value> for Filter {
    type Error = QueryError;

    /// Parses `{"field": value, ...}`; `null` selects everything.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let conditions = match value {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(QueryError::new(format!(
                    "filter must be a JSON object, got `{other}`"
                )))
            }
        };

        let filter = Self { conditions };
        filter.check()?;
        Ok(filter)
    }
}

/// Field assignments applied to matched documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Map<String, Value>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `$set` assignment.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    /// Assignments in insertion order.
    pub fn assignments(&self) -> &Map<String, Value> {
        &self.set
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Copy of this update keeping only fields accepted by `keep`.
    pub fn retain_fields(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            set: self
                .set
                .iter()
                .filter(|(field, _)| keep(field))
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        }
    }

    /// Rejects assignments that would rewrite identity.
    pub fn check(&self) -> Result<(), QueryError> {
        if self.set.contains_key(ID_FIELD) {
            return Err(QueryError::new(format!(
                "field `{ID_FIELD}` is immutable"
            )));
        }
        Ok(())
    }

    /// Applies assignments to `body`; returns whether anything changed.
    pub fn apply(&self, body: &mut Document) -> bool {
        let mut changed = false;
        for (field, value) in &self.set {
            if body.get(field) != Some(value) {
                body.insert(field.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }
}

impl TryFrom<Value> for Update {
    type Error = QueryError;

    /// Parses `{"$set": {...}}`; bare top-level fields count as `$set`.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(entries) = value else {
            return Err(QueryError::new("update must be a JSON object"));
        };

        let mut update = Self::new();
        for (key, value) in entries {
            if key == SET_OPERATOR {
                let Value::Object(fields) = value else {
                    return Err(QueryError::new("`$set` must be a JSON object"));
                };
                update.set.extend(fields);
            } else if key.starts_with('$') {
                return Err(QueryError::new(format!(
                    "unsupported update operator `{key}`"
                )));
            } else {
                update.set.insert(key, value);
            }
        }

        update.check()?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::{Filter, Update, ID_FIELD};
    use serde_json::{json, Map, Value};
    use uuid::Uuid;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let doc = body(json!({ "firstName": "Ann" }));
        assert!(Filter::all().matches(Uuid::new_v4(), &doc));
    }

    #[test]
    fn null_condition_matches_missing_field() {
        let doc = body(json!({ "firstName": "Ann" }));
        let filter = Filter::all().eq("department", Value::Null);
        assert!(filter.matches(Uuid::new_v4(), &doc));
    }

    #[test]
    fn id_condition_compares_parsed_uuid() {
        let id = Uuid::new_v4();
        let doc = body(json!({}));
        let upper = Filter::all().eq(ID_FIELD, id.to_string().to_uppercase());
        assert!(upper.matches(id, &doc));
        assert!(!Filter::by_id(Uuid::new_v4()).matches(id, &doc));
    }

    #[test]
    fn filter_parse_rejects_operators() {
        assert!(Filter::try_from(json!({ "$or": [] })).is_err());
        assert!(Filter::try_from(json!({ "firstName": { "$ne": "x" } })).is_err());
        assert!(Filter::try_from(json!([1, 2])).is_err());
        assert!(Filter::try_from(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn built_filters_with_operators_fail_check() {
        assert!(Filter::all().eq("$or", json!([])).check().is_err());
        assert!(Filter::all()
            .eq("firstName", json!({ "$ne": "x" }))
            .check()
            .is_err());
        assert!(Filter::all()
            .eq("address", json!({ "city": "Oslo" }))
            .check()
            .is_ok());
        assert!(Filter::by_id(Uuid::new_v4()).check().is_ok());
    }

    #[test]
    fn update_parse_merges_set_and_bare_fields() {
        let update =
            Update::try_from(json!({ "$set": { "firstName": "A" }, "lastName": "B" })).unwrap();
        assert_eq!(update.assignments().len(), 2);
        assert_eq!(update.assignments()["lastName"], "B");
    }

    #[test]
    fn update_parse_rejects_unknown_operator_and_id() {
        assert!(Update::try_from(json!({ "$inc": { "age": 1 } })).is_err());
        assert!(Update::try_from(json!({ "$set": 3 })).is_err());
        assert!(Update::try_from(json!({ "$set": { "_id": "x" } })).is_err());
    }

    #[test]
    fn apply_reports_change_only_when_value_differs() {
        let mut doc = body(json!({ "firstName": "Ann" }));
        assert!(!Update::new().set("firstName", "Ann").apply(&mut doc));
        assert!(Update::new().set("firstName", "Bea").apply(&mut doc));
        assert_eq!(doc["firstName"], "Bea");
    }
}
