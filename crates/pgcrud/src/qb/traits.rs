//! Trait definitions for statement builders.

use crate::error::CrudResult;
use crate::qb::param::ParamList;

/// Base trait for all statement builders.
pub trait SqlQb: Sync {
    /// Short label used in logs (`"insert"`, `"delete"`, ...).
    const KIND: &'static str;

    /// Build the SQL string and its parameters.
    fn build(&self) -> (String, ParamList);

    /// Validate builder state before execution.
    fn validate(&self) -> CrudResult<()> {
        Ok(())
    }

    /// Validate, then build.
    fn build_checked(&self) -> CrudResult<(String, ParamList)> {
        self.validate()?;
        Ok(self.build())
    }

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> String {
        self.build().0
    }
}
