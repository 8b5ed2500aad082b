//! Unit tests for the qb module.

use crate::codec::{BoundValue, DeclaredType};
use crate::error::CrudError;
use crate::ident::Ident;
use crate::qb::{
    DeleteQb, Filter, InsertQb, SelectQb, SqlQb, UpdateQb, delete_where, insert_record,
    select_all, select_columns, update_where,
};
use crate::record::Record;

fn student() -> Record {
    Record::new()
        .with("id", "1", "integer")
        .and_then(|r| r.with("name", "Ana", "character varying"))
        .and_then(|r| r.with("active", "true", "boolean"))
        .unwrap()
}

fn by_id(id: &str) -> Record {
    Record::new().with("id", id, "integer").unwrap()
}

#[test]
fn test_select_all() {
    let qb = select_all("school", "student").unwrap();
    assert_eq!(qb.to_sql(), r#"SELECT * FROM "school"."student""#);
    assert!(qb.build().1.is_empty());
}

#[test]
fn test_select_columns() {
    let qb = select_columns("school", "student", &["name", "active"]).unwrap();
    assert_eq!(
        qb.to_sql(),
        r#"SELECT "name", "active" FROM "school"."student""#
    );
}

#[test]
fn test_select_builder_single_column() {
    let qb = SelectQb::new(Ident::qualified("public", "t").unwrap())
        .column(Ident::new("c").unwrap());
    assert_eq!(qb.to_sql(), r#"SELECT "c" FROM "public"."t""#);
}

#[test]
fn test_insert_from_record() {
    let qb = insert_record("school", "student", &student()).unwrap();
    let (sql, params) = qb.build();
    assert_eq!(
        sql,
        r#"INSERT INTO "school"."student" ("id", "name", "active") VALUES ($1, $2, $3)"#
    );
    assert_eq!(
        params.values(),
        &[
            BoundValue::Integer(1),
            BoundValue::Text("Ana".into()),
            BoundValue::Boolean(true)
        ]
    );
    assert_eq!(params.as_refs().len(), 3);
}

#[test]
fn test_insert_keeps_record_order() {
    let record = Record::new()
        .with("name", "Bo", "character varying")
        .and_then(|r| r.with("id", "2", "integer"))
        .unwrap();
    let sql = insert_record("school", "student", &record).unwrap().to_sql();
    assert_eq!(
        sql,
        r#"INSERT INTO "school"."student" ("name", "id") VALUES ($1, $2)"#
    );
}

#[test]
fn test_insert_empty_record_uses_defaults() {
    let sql = insert_record("school", "student", &Record::new())
        .unwrap()
        .to_sql();
    assert_eq!(sql, r#"INSERT INTO "school"."student" DEFAULT VALUES"#);
}

#[test]
fn test_insert_null_field_binds_typed_null() {
    let mut record = by_id("3");
    record.push_null("born", "date").unwrap();
    let (_, params) = insert_record("school", "student", &record).unwrap().build();
    assert_eq!(params.values()[1], BoundValue::Null(DeclaredType::Date));
}

#[test]
fn test_insert_codec_failure_builds_nothing() {
    let record = Record::new()
        .with("id", "one", "integer")
        .unwrap();
    let err = insert_record("school", "student", &record).unwrap_err();
    assert!(matches!(err, CrudError::Format { .. }));

    let record = Record::new().with("price", "1.50", "numeric").unwrap();
    let err = insert_record("shop", "item", &record).unwrap_err();
    assert!(matches!(err, CrudError::UnsupportedType(t) if t == "numeric"));
}

#[test]
fn test_insert_builder_direct() {
    let qb = InsertQb::new(Ident::qualified("a", "b").unwrap())
        .set(Ident::new("x").unwrap(), BoundValue::BigInt(5));
    assert_eq!(qb.to_sql(), r#"INSERT INTO "a"."b" ("x") VALUES ($1)"#);
}

#[test]
fn test_delete_where() {
    let qb = delete_where("school", "student", &by_id("1")).unwrap();
    let (sql, params) = qb.build_checked().unwrap();
    assert_eq!(sql, r#"DELETE FROM "school"."student" WHERE "id" = $1"#);
    assert_eq!(params.values(), &[BoundValue::Integer(1)]);
}

#[test]
fn test_delete_conjunction_in_record_order() {
    let where_record = Record::new()
        .with("name", "Ana", "character varying")
        .and_then(|r| r.with("active", "false", "boolean"))
        .unwrap();
    let sql = delete_where("school", "student", &where_record)
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        r#"DELETE FROM "school"."student" WHERE "name" = $1 AND "active" = $2"#
    );
}

#[test]
fn test_delete_null_filter_uses_is_null() {
    let mut where_record = Record::new();
    where_record.push_null("born", "date").unwrap();
    where_record.push("id", "4", "integer").unwrap();
    let (sql, params) = delete_where("school", "student", &where_record)
        .unwrap()
        .build();
    assert_eq!(
        sql,
        r#"DELETE FROM "school"."student" WHERE "born" IS NULL AND "id" = $1"#
    );
    assert_eq!(params.len(), 1);
}

#[test]
fn test_delete_without_filter_is_refused() {
    let qb = DeleteQb::new(Ident::qualified("school", "student").unwrap());
    assert!(matches!(qb.build_checked(), Err(CrudError::Validation(_))));
    assert_eq!(qb.to_sql(), r#"DELETE FROM "school"."student" WHERE 1=0"#);
}

#[test]
fn test_update_where() {
    let qb = update_where(
        "school",
        "student",
        "name",
        BoundValue::Text("Ana Maria".into()),
        &by_id("1"),
    )
    .unwrap();
    let (sql, params) = qb.build_checked().unwrap();
    assert_eq!(
        sql,
        r#"UPDATE "school"."student" SET "name" = $1 WHERE "id" = $2"#
    );
    assert_eq!(
        params.values(),
        &[BoundValue::Text("Ana Maria".into()), BoundValue::Integer(1)]
    );
}

#[test]
fn test_update_numbering_skips_null_filters() {
    let mut where_record = Record::new();
    where_record.push_null("born", "date").unwrap();
    where_record.push("active", "true", "boolean").unwrap();
    let sql = update_where(
        "school",
        "student",
        "active",
        BoundValue::Boolean(false),
        &where_record,
    )
    .unwrap()
    .to_sql();
    assert_eq!(
        sql,
        r#"UPDATE "school"."student" SET "active" = $1 WHERE "born" IS NULL AND "active" = $2"#
    );
}

#[test]
fn test_update_requires_set_and_filter() {
    let table = Ident::qualified("s", "t").unwrap();
    let no_set = UpdateQb::new(table.clone()).eq(Ident::new("id").unwrap(), BoundValue::Integer(1));
    assert!(matches!(no_set.validate(), Err(CrudError::Validation(_))));

    let no_filter = UpdateQb::new(table).set(Ident::new("x").unwrap(), BoundValue::Integer(1));
    assert!(matches!(no_filter.validate(), Err(CrudError::Validation(_))));
}

#[test]
fn test_filter_from_record_rejects_bad_values() {
    let where_record = Record::new().with("active", "maybe", "boolean").unwrap();
    assert!(matches!(
        Filter::from_record(&where_record),
        Err(CrudError::Format { .. })
    ));
}

#[test]
fn test_values_never_reach_sql_text() {
    let payload = "x'); DROP TABLE student; --";
    let record = Record::new()
        .with("name", payload, "character varying")
        .unwrap();
    let sql = insert_record("school", "student", &record).unwrap().to_sql();
    assert!(!sql.contains(payload));
    let sql = delete_where("school", "student", &record).unwrap().to_sql();
    assert!(!sql.contains("DROP"));
}

#[test]
fn test_quoted_identifiers_escape_catalog_names() {
    let record = Record::new().with(r#"we"ird"#, "1", "integer").unwrap();
    let sql = insert_record("My Schema", "Order", &record).unwrap().to_sql();
    assert_eq!(
        sql,
        r#"INSERT INTO "My Schema"."Order" ("we""ird") VALUES ($1)"#
    );
}
