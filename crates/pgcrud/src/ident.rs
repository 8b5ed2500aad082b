//! SQL identifier rendering for catalog-derived names.
//!
//! Schema, table, and column names handed to the statement builders come from
//! catalog lookups, so they are the only text ever spliced into SQL. They are
//! always rendered as quoted identifiers, which keeps mixed-case names,
//! reserved words, and embedded quotes intact:
//!
//! ```ignore
//! use pgcrud::Ident;
//!
//! let t = Ident::qualified("school", "student")?;
//! assert_eq!(t.to_sql(), r#""school"."student""#);
//! # Ok::<(), pgcrud::CrudError>(())
//! ```

use crate::error::{CrudError, CrudResult};
use std::fmt;

/// A possibly dotted SQL identifier (`schema.table` or `column`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<String>,
}

impl Ident {
    /// Create a single-part identifier from a raw catalog name.
    pub fn new(name: &str) -> CrudResult<Self> {
        Ok(Self {
            parts: vec![check_part(name)?],
        })
    }

    /// Create a `schema.table` identifier.
    pub fn qualified(schema: &str, table: &str) -> CrudResult<Self> {
        Ok(Self {
            parts: vec![check_part(schema)?, check_part(table)?],
        })
    }

    /// The raw (unquoted) name of the last part.
    pub fn name(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        // dots plus surrounding quotes; escapes may add more
        let cap = self.parts.iter().map(|p| p.len() + 3).sum();
        let mut out = String::with_capacity(cap);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push('"');
            for ch in part.chars() {
                if ch == '"' {
                    out.push('"');
                    out.push('"');
                } else {
                    out.push(ch);
                }
            }
            out.push('"');
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn check_part(name: &str) -> CrudResult<String> {
    if name.is_empty() {
        return Err(CrudError::validation("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(CrudError::validation(
            "Identifier cannot contain NUL character",
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ident_simple() {
        let ident = Ident::new("student").unwrap();
        assert_eq!(ident.to_sql(), r#""student""#);
        assert_eq!(ident.name(), "student");
    }

    #[test]
    fn ident_qualified() {
        let ident = Ident::qualified("school", "student").unwrap();
        assert_eq!(ident.to_sql(), r#""school"."student""#);
        assert_eq!(ident.name(), "student");
    }

    #[test]
    fn ident_keeps_case_and_spaces() {
        let ident = Ident::qualified("Sales", "Order Lines").unwrap();
        assert_eq!(ident.to_string(), r#""Sales"."Order Lines""#);
    }

    #[test]
    fn ident_escapes_quotes() {
        let ident = Ident::new(r#"has"quote"#).unwrap();
        assert_eq!(ident.to_sql(), r#""has""quote""#);
    }

    #[test]
    fn ident_rejects_empty_and_nul() {
        assert!(Ident::new("").is_err());
        assert!(Ident::qualified("public", "").is_err());
        assert!(Ident::new("bad\0name").is_err());
    }
}
