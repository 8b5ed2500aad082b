//! SELECT builder.

use crate::ident::Ident;
use crate::qb::param::ParamList;
use crate::qb::traits::SqlQb;

/// `SELECT * | c1, c2 FROM schema.table`.
#[derive(Clone, Debug)]
pub struct SelectQb {
    table: Ident,
    /// Empty means `*`.
    columns: Vec<Ident>,
}

impl SelectQb {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            columns: Vec::new(),
        }
    }

    /// Restrict the projection to `column` (may be called repeatedly).
    pub fn column(mut self, column: Ident) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = Ident>) -> Self {
        self.columns.extend(columns);
        self
    }
}

impl SqlQb for SelectQb {
    const KIND: &'static str = "select";

    fn build(&self) -> (String, ParamList) {
        let mut sql = String::from("SELECT ");
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                column.write_sql(&mut sql);
            }
        }
        sql.push_str(" FROM ");
        self.table.write_sql(&mut sql);
        (sql, ParamList::new())
    }
}
