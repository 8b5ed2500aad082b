//! Catalog lookups.
//!
//! Every function here is a fresh round trip: nothing is cached, so two calls
//! may observe schema changes made in between. Schema and table names are
//! bound as parameters, never spliced into the query text.

use crate::client::GenericClient;
use crate::error::{CrudError, CrudResult};
use tokio_postgres::Row;

const LIST_SCHEMAS_SQL: &str = r#"
SELECT nspname AS schema_name
FROM pg_catalog.pg_namespace
WHERE nspname <> 'pg_toast'
  AND nspname !~ '^pg_'
  AND nspname <> 'information_schema'
ORDER BY nspname
"#;

const LIST_TABLES_SQL: &str = r#"
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_schema::text = $1
  AND table_type = 'BASE TABLE'
ORDER BY table_name
"#;

const DESCRIBE_TABLE_SQL: &str = r#"
SELECT
  column_name::text AS column_name,
  data_type::text AS data_type,
  ordinal_position::int4 AS ordinal
FROM information_schema.columns
WHERE table_schema::text = $1
  AND table_name::text = $2
ORDER BY ordinal_position
"#;

/// One column of a table as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub data_type: String,
    /// 1-based position in the table.
    pub ordinal: i32,
}

/// Schema names, excluding `pg_*`, `pg_toast`, and `information_schema`.
pub async fn list_schemas<C: GenericClient>(client: &C) -> CrudResult<Vec<String>> {
    let rows = client
        .query(LIST_SCHEMAS_SQL, &[])
        .await
        .map_err(CrudError::into_catalog)?;
    rows.iter().map(|r| get_text(r, "schema_name")).collect()
}

/// Base tables of `schema`; views are excluded.
pub async fn list_tables<C: GenericClient>(client: &C, schema: &str) -> CrudResult<Vec<String>> {
    let rows = client
        .query(LIST_TABLES_SQL, &[&schema])
        .await
        .map_err(CrudError::into_catalog)?;
    rows.iter().map(|r| get_text(r, "table_name")).collect()
}

/// Columns of `schema.table` in catalog order.
///
/// An unknown table yields an empty list, not an error.
pub async fn describe_table<C: GenericClient>(
    client: &C,
    schema: &str,
    table: &str,
) -> CrudResult<Vec<ColumnMeta>> {
    let rows = client
        .query(DESCRIBE_TABLE_SQL, &[&schema, &table])
        .await
        .map_err(CrudError::into_catalog)?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        columns.push(ColumnMeta {
            schema: schema.to_string(),
            table: table.to_string(),
            name: get_text(row, "column_name")?,
            data_type: get_text(row, "data_type")?,
            ordinal: row
                .try_get("ordinal")
                .map_err(|e| CrudError::CatalogQuery(format!("column 'ordinal': {e}")))?,
        });
    }
    Ok(columns)
}

/// Column names of `schema.table` in catalog order.
pub async fn list_columns<C: GenericClient>(
    client: &C,
    schema: &str,
    table: &str,
) -> CrudResult<Vec<String>> {
    let columns = describe_table(client, schema, table).await?;
    Ok(columns.into_iter().map(|c| c.name).collect())
}

/// Declared types of `schema.table`, index-aligned with [`list_columns`].
pub async fn list_column_types<C: GenericClient>(
    client: &C,
    schema: &str,
    table: &str,
) -> CrudResult<Vec<String>> {
    let columns = describe_table(client, schema, table).await?;
    Ok(columns.into_iter().map(|c| c.data_type).collect())
}

/// Declared type of one column.
pub async fn column_type<C: GenericClient>(
    client: &C,
    schema: &str,
    table: &str,
    column: &str,
) -> CrudResult<String> {
    let columns = describe_table(client, schema, table).await?;
    find_column_type(&columns, schema, table, column)
}

/// Match `column` by exact name among already-fetched metadata.
pub fn find_column_type(
    columns: &[ColumnMeta],
    schema: &str,
    table: &str,
    column: &str,
) -> CrudResult<String> {
    columns
        .iter()
        .find(|c| c.name == column)
        .map(|c| c.data_type.clone())
        .ok_or_else(|| CrudError::column_not_found(schema, table, column))
}

fn get_text(row: &Row, column: &str) -> CrudResult<String> {
    row.try_get(column)
        .map_err(|e| CrudError::CatalogQuery(format!("column '{column}': {e}")))
}
