use employee_core::db::open_db_in_memory;
use employee_core::{
    Candidate, Document, DocumentCollection, EmployeeField, EmployeeRepository, EmployeeStore,
    Filter, RepoError, SqliteCollection, StorageError, Update, UpdateValidation,
};
use rusqlite::{params, Connection};
use serde_json::{json, Value};
use uuid::Uuid;

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("document literal must be an object"),
    }
}

fn collection(conn: &Connection) -> SqliteCollection<'_> {
    SqliteCollection::try_new(conn, "employees").unwrap()
}

#[test]
fn find_many_preserves_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let collection = collection(&conn);

    let ids: Vec<_> = ["c", "a", "b"]
        .iter()
        .map(|name| collection.insert_one(&doc(json!({ "firstName": name }))).unwrap())
        .collect();

    let found: Vec<_> = collection
        .find_many(&Filter::all())
        .unwrap()
        .into_iter()
        .map(|document| document.id)
        .collect();
    assert_eq!(found, ids);
    assert_eq!(collection.count().unwrap(), 3);
}

#[test]
fn replace_one_overwrites_body_and_reports_unknown_ids() {
    let conn = open_db_in_memory().unwrap();
    let collection = collection(&conn);
    let id = collection
        .insert_one(&doc(json!({ "firstName": "Ann", "nickname": "A" })))
        .unwrap();

    assert!(collection
        .replace_one(id, &doc(json!({ "firstName": "Bea" })))
        .unwrap());
    let stored = collection.find_one(&Filter::by_id(id)).unwrap().unwrap();
    assert_eq!(stored.body, doc(json!({ "firstName": "Bea" })));

    assert!(!collection
        .replace_one(Uuid::new_v4(), &doc(json!({})))
        .unwrap());
}

#[test]
fn filter_on_missing_field_with_null_matches() {
    let conn = open_db_in_memory().unwrap();
    let collection = collection(&conn);
    collection
        .insert_one(&doc(json!({ "firstName": "Ann" })))
        .unwrap();
    collection
        .insert_one(&doc(json!({ "firstName": "Bea", "department": "Ops" })))
        .unwrap();

    let without_department = collection
        .find_many(&Filter::all().eq("department", Value::Null))
        .unwrap();
    assert_eq!(without_department.len(), 1);
    assert_eq!(without_department[0].body["firstName"], "Ann");
}

#[test]
fn filter_parsed_from_json_selects_exact_values() {
    let conn = open_db_in_memory().unwrap();
    let collection = collection(&conn);
    collection
        .insert_one(&doc(json!({ "firstName": "joHN", "department": "Test Dep" })))
        .unwrap();

    let exact = Filter::try_from(json!({ "firstName": "joHN" })).unwrap();
    let folded = Filter::try_from(json!({ "firstName": "john" })).unwrap();
    assert!(collection.find_one(&exact).unwrap().is_some());
    assert!(collection.find_one(&folded).unwrap().is_none());
}

#[test]
fn corrupt_rows_surface_as_storage_errors() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
        params!["employees", "not-a-uuid", "{}"],
    )
    .unwrap();

    let store = EmployeeStore::new(collection(&conn));
    let err = store.find_all().unwrap_err();
    assert!(
        matches!(err, RepoError::Storage(StorageError::Corrupt(_))),
        "unexpected error: {err}"
    );
}

#[test]
fn documents_failing_schema_are_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let collection = collection(&conn);
    collection
        .insert_one(&doc(json!({ "firstName": "Ann", "lastName": "Lee" })))
        .unwrap();

    let store = EmployeeStore::new(collection);
    let err = store.find_one(&Filter::all()).unwrap_err();
    match err {
        RepoError::InvalidData(message) => assert!(message.contains("department"), "{message}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn typed_update_validation_strips_unknown_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(collection(&conn));
    let employee = store
        .create(&Candidate::from_parts("Ann", "Lee", "Ops"))
        .unwrap();

    let update =
        Update::try_from(json!({ "$set": { "department": "Sales", "salary": 10 } })).unwrap();
    store.update_one(&Filter::by_id(employee.id), &update).unwrap();

    let stored = store
        .collection()
        .find_one(&Filter::by_id(employee.id))
        .unwrap()
        .unwrap();
    assert!(!stored.body.contains_key("salary"));
    assert_eq!(store.find_all().unwrap()[0].department, "Sales");
}

#[test]
fn default_update_validation_rejects_empty_strings() {
    let conn = open_db_in_memory().unwrap();
    let store = EmployeeStore::new(collection(&conn));
    let employee = store
        .create(&Candidate::from_parts("Ann", "Lee", "Ops"))
        .unwrap();

    let update = Update::new().set("firstName", "");
    let err = store.update_one(&Filter::all(), &update).unwrap_err();
    match err {
        RepoError::Validation(err) => {
            assert_eq!(err.fields(), vec![EmployeeField::FirstName]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.find_all().unwrap(), vec![employee]);
}

#[test]
fn strict_update_validation_rejects_unknown_fields() {
    let conn = open_db_in_memory().unwrap();
    let store =
        EmployeeStore::new(collection(&conn)).with_update_validation(UpdateValidation::Strict);
    store
        .create(&Candidate::from_parts("Ann", "Lee", "Ops"))
        .unwrap();

    let update = Update::new().set("department", "Sales").set("salary", 10);
    let err = store.update_many(&Filter::all(), &update).unwrap_err();
    match err {
        RepoError::InvalidQuery(err) => assert!(err.to_string().contains("salary"), "{err}"),
        other => panic!("unexpected error: {other}"),
    }

    let wrong_types = Update::new().set("department", "").set("firstName", 7);
    let err = store.update_many(&Filter::all(), &wrong_types).unwrap_err();
    match err {
        RepoError::Validation(err) => assert_eq!(err.issues().len(), 2),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.find_all().unwrap()[0].department, "Ops");
}

#[test]
fn pass_through_update_keeps_unknown_fields() {
    let conn = open_db_in_memory().unwrap();
    let store =
        EmployeeStore::new(collection(&conn)).with_update_validation(UpdateValidation::PassThrough);
    let employee = store
        .create(&Candidate::from_parts("Ann", "Lee", "Ops"))
        .unwrap();

    store
        .update_one(&Filter::all(), &Update::new().set("salary", 10))
        .unwrap();

    let stored = store
        .collection()
        .find_one(&Filter::by_id(employee.id))
        .unwrap()
        .unwrap();
    assert_eq!(stored.body["salary"], 10);
    assert_eq!(store.find_all().unwrap(), vec![employee]);
}
