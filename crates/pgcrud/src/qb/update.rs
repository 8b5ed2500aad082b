//! UPDATE builder.

use crate::codec::BoundValue;
use crate::error::{CrudError, CrudResult};
use crate::ident::Ident;
use crate::qb::filter::Filter;
use crate::qb::param::ParamList;
use crate::qb::traits::SqlQb;

/// `UPDATE table SET c = $1 WHERE w1 = $2 AND ...`.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: Ident,
    set_fields: Vec<(Ident, BoundValue)>,
    filter: Filter,
}

impl UpdateQb {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            set_fields: Vec::new(),
            filter: Filter::new(),
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: Ident, value: BoundValue) -> Self {
        self.set_fields.push((column, value));
        self
    }

    /// Add WHERE: column = value
    pub fn eq(mut self, column: Ident, value: BoundValue) -> Self {
        self.filter = self.filter.eq(column, value);
        self
    }

    /// Replace the WHERE clause.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}

impl SqlQb for UpdateQb {
    const KIND: &'static str = "update";

    fn build(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let mut sql = String::from("UPDATE ");
        self.table.write_sql(&mut sql);
        sql.push_str(" SET ");
        for (i, (column, value)) in self.set_fields.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            column.write_sql(&mut sql);
            let idx = params.push(value.clone());
            sql.push_str(&format!(" = ${idx}"));
        }
        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            let where_sql = self.filter.build(&mut params);
            sql.push_str(&where_sql);
        }
        (sql, params)
    }

    fn validate(&self) -> CrudResult<()> {
        if self.set_fields.is_empty() {
            return Err(CrudError::validation(
                "UpdateQb: at least one SET column is required",
            ));
        }
        if self.filter.is_empty() {
            return Err(CrudError::validation(
                "UpdateQb: refusing to update every row; add at least one filter column",
            ));
        }
        Ok(())
    }
}
