//! Equality-conjunction WHERE clauses.

use crate::codec::BoundValue;
use crate::error::CrudResult;
use crate::ident::Ident;
use crate::qb::param::ParamList;
use crate::record::Record;

/// `c1 = $n AND c2 = $m ...`; a NULL value compiles to `c IS NULL`.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    terms: Vec<(Ident, BoundValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add `column = value`.
    pub fn eq(mut self, column: Ident, value: BoundValue) -> Self {
        self.terms.push((column, value));
        self
    }

    /// One term per record field, in record order, bound with the stored types.
    pub fn from_record(record: &Record) -> CrudResult<Self> {
        let mut filter = Self::new();
        for field in record {
            filter = filter.eq(Ident::new(&field.column)?, field.bind()?);
        }
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Render the conjunction, pushing values onto `params`.
    pub(crate) fn build(&self, params: &mut ParamList) -> String {
        let mut out = String::new();
        for (i, (column, value)) in self.terms.iter().enumerate() {
            if i > 0 {
                out.push_str(" AND ");
            }
            column.write_sql(&mut out);
            if value.is_null() {
                out.push_str(" IS NULL");
            } else {
                let idx = params.push(value.clone());
                out.push_str(&format!(" = ${idx}"));
            }
        }
        out
    }
}
