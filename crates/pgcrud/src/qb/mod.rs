//! Statement builders.
//!
//! Identifiers are rendered quoted; every value becomes a positional
//! parameter, numbered at build time in the order it appears in the SQL.
//!
//! ```ignore
//! use pgcrud::{qb, Ident, Record, SqlQb};
//!
//! let record = Record::new()
//!     .with("id", "1", "integer")?
//!     .with("name", "Ana", "character varying")?;
//! let (sql, params) = qb::insert_record("school", "student", &record)?.build();
//! assert_eq!(sql, r#"INSERT INTO "school"."student" ("id", "name") VALUES ($1, $2)"#);
//! assert_eq!(params.len(), 2);
//! # Ok::<(), pgcrud::CrudError>(())
//! ```

mod delete;
mod filter;
mod insert;
mod param;
mod select;
mod traits;
mod update;

#[cfg(test)]
mod tests;

pub use delete::DeleteQb;
pub use filter::Filter;
pub use insert::InsertQb;
pub use param::ParamList;
pub use select::SelectQb;
pub use traits::SqlQb;
pub use update::UpdateQb;

use crate::codec::BoundValue;
use crate::error::CrudResult;
use crate::ident::Ident;
use crate::record::Record;

/// `SELECT * FROM schema.table`.
pub fn select_all(schema: &str, table: &str) -> CrudResult<SelectQb> {
    Ok(SelectQb::new(Ident::qualified(schema, table)?))
}

/// `SELECT c1, c2 FROM schema.table`.
pub fn select_columns(schema: &str, table: &str, columns: &[&str]) -> CrudResult<SelectQb> {
    let columns = columns
        .iter()
        .map(|c| Ident::new(c))
        .collect::<CrudResult<Vec<_>>>()?;
    Ok(SelectQb::new(Ident::qualified(schema, table)?).columns(columns))
}

/// INSERT of every field of `record`.
pub fn insert_record(schema: &str, table: &str, record: &Record) -> CrudResult<InsertQb> {
    InsertQb::from_record(Ident::qualified(schema, table)?, record)
}

/// DELETE of the rows matching every field of `where_record`.
pub fn delete_where(schema: &str, table: &str, where_record: &Record) -> CrudResult<DeleteQb> {
    Ok(DeleteQb::new(Ident::qualified(schema, table)?).filter(Filter::from_record(where_record)?))
}

/// UPDATE of one column on the rows matching every field of `where_record`.
pub fn update_where(
    schema: &str,
    table: &str,
    set_column: &str,
    new_value: BoundValue,
    where_record: &Record,
) -> CrudResult<UpdateQb> {
    Ok(UpdateQb::new(Ident::qualified(schema, table)?)
        .set(Ident::new(set_column)?, new_value)
        .filter(Filter::from_record(where_record)?))
}
