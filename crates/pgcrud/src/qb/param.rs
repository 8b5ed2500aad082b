//! Positional parameter storage for built statements.

use crate::codec::BoundValue;
use tokio_postgres::types::ToSql;

/// Parameters in placeholder order (`$1`, `$2`, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    params: Vec<BoundValue>,
}

impl ParamList {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter and return its 1-based index.
    pub fn push(&mut self, value: BoundValue) -> usize {
        self.params.push(value);
        self.params.len()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn values(&self) -> &[BoundValue] {
        &self.params
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }
}
