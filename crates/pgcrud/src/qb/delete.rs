//! DELETE builder.

use crate::codec::BoundValue;
use crate::error::{CrudError, CrudResult};
use crate::ident::Ident;
use crate::qb::filter::Filter;
use crate::qb::param::ParamList;
use crate::qb::traits::SqlQb;

/// `DELETE FROM table WHERE c1 = $1 AND ...`.
///
/// A DELETE without filter columns never validates; see [`SqlQb::validate`].
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: Ident,
    filter: Filter,
}

impl DeleteQb {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            filter: Filter::new(),
        }
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

impl SqlQb for DeleteQb {
    const KIND: &'static str = "delete";

    fn build(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let mut sql = String::from("DELETE FROM ");
        self.table.write_sql(&mut sql);
        if self.filter.is_empty() {
            // Unreachable through build_checked; keep the raw form harmless.
            sql.push_str(" WHERE 1=0");
        } else {
            sql.push_str(" WHERE ");
            let where_sql = self.filter.build(&mut params);
            sql.push_str(&where_sql);
        }
        (sql, params)
    }

    fn validate(&self) -> CrudResult<()> {
        if self.filter.is_empty() {
            return Err(CrudError::validation(
                "DeleteQb: refusing to delete every row; add at least one filter column",
            ));
        }
        Ok(())
    }
}
