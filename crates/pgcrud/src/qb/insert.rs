//! INSERT builder.

use crate::codec::BoundValue;
use crate::error::CrudResult;
use crate::ident::Ident;
use crate::qb::param::ParamList;
use crate::qb::traits::SqlQb;
use crate::record::Record;

/// `INSERT INTO table (c1, c2, ...) VALUES ($1, $2, ...)`.
#[derive(Clone, Debug)]
pub struct InsertQb {
    table: Ident,
    columns: Vec<Ident>,
    values: Vec<BoundValue>,
}

impl InsertQb {
    pub fn new(table: Ident) -> Self {
        Self {
            table,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: Ident, value: BoundValue) -> Self {
        self.columns.push(column);
        self.values.push(value);
        self
    }

    /// One column per record field, bound with the field's stored type.
    ///
    /// Fails on the first field the codec rejects; nothing is built.
    pub fn from_record(table: Ident, record: &Record) -> CrudResult<Self> {
        let mut qb = Self::new(table);
        for field in record {
            qb = qb.set(Ident::new(&field.column)?, field.bind()?);
        }
        Ok(qb)
    }
}

impl SqlQb for InsertQb {
    const KIND: &'static str = "insert";

    fn build(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let mut sql = String::from("INSERT INTO ");
        self.table.write_sql(&mut sql);

        if self.columns.is_empty() {
            sql.push_str(" DEFAULT VALUES");
            return (sql, params);
        }

        sql.push_str(" (");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            column.write_sql(&mut sql);
        }
        sql.push_str(") VALUES (");
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let idx = params.push(value.clone());
            sql.push_str(&format!("${idx}"));
        }
        sql.push(')');
        (sql, params)
    }
}
