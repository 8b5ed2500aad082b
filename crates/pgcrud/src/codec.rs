//! Typed value codec.
//!
//! Console input arrives as text. Before it can be sent as a statement
//! parameter it has to become the Rust value whose wire encoding matches the
//! column's declared SQL type, because the extended query protocol rejects a
//! parameter of the wrong type. [`DeclaredType`] is the closed set of types
//! the codec understands; anything else the catalog reports is rejected with
//! [`CrudError::UnsupportedType`] before a statement is built.
//!
//! ```ignore
//! use pgcrud::codec::{self, BoundValue};
//!
//! assert_eq!(codec::bind("INTEGER", "42")?, BoundValue::Integer(42));
//! assert!(codec::bind("boolean", "yes").is_err());
//! assert!(codec::bind("numeric", "1.5").is_err());
//! # Ok::<(), pgcrud::CrudError>(())
//! ```

use crate::error::{CrudError, CrudResult};
use bytes::BytesMut;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// Date layout accepted by the codec.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQL types the codec can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    /// `integer` (int4)
    Integer,
    /// `big int` / `bigint` (int8)
    BigInt,
    /// `character` (bpchar)
    Character,
    /// `character varying` (varchar)
    CharacterVarying,
    /// `boolean`
    Boolean,
    /// `date`
    Date,
}

impl DeclaredType {
    /// Every supported type, in a stable order.
    pub const ALL: [DeclaredType; 6] = [
        Self::Integer,
        Self::BigInt,
        Self::Character,
        Self::CharacterVarying,
        Self::Boolean,
        Self::Date,
    ];

    /// Resolve a catalog type name (case-insensitive).
    pub fn parse(name: &str) -> CrudResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "integer" => Ok(Self::Integer),
            "big int" | "bigint" => Ok(Self::BigInt),
            "character" => Ok(Self::Character),
            "character varying" => Ok(Self::CharacterVarying),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            _ => Err(CrudError::UnsupportedType(name.to_string())),
        }
    }

    /// Catalog spelling of the type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Character => "character",
            Self::CharacterVarying => "character varying",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }

    /// Convert raw text into a parameter of this type.
    pub fn bind(self, raw: &str) -> CrudResult<BoundValue> {
        match self {
            Self::Integer => raw
                .parse::<i32>()
                .map(BoundValue::Integer)
                .map_err(|e| CrudError::format(self.name(), raw, e.to_string())),
            Self::BigInt => raw
                .parse::<i64>()
                .map(BoundValue::BigInt)
                .map_err(|e| CrudError::format(self.name(), raw, e.to_string())),
            Self::Character | Self::CharacterVarying => Ok(BoundValue::Text(raw.to_string())),
            Self::Boolean => parse_bool(raw)
                .map(BoundValue::Boolean)
                .ok_or_else(|| CrudError::format(self.name(), raw, "expected 'true' or 'false'")),
            Self::Date => parse_date(raw).map(BoundValue::Date),
        }
    }

    /// A typed NULL parameter.
    pub fn bind_null(self) -> BoundValue {
        BoundValue::Null(self)
    }

    /// Normalize text-protocol output of this type.
    ///
    /// Booleans come back as `t`/`f`; everything else is already in the form
    /// [`DeclaredType::bind`] accepts.
    pub fn canonical_text(self, raw: &str) -> String {
        match (self, raw) {
            (Self::Boolean, "t") => "true".to_string(),
            (Self::Boolean, "f") => "false".to_string(),
            _ => raw.to_string(),
        }
    }

    fn accepts(self, ty: &Type) -> bool {
        match self {
            Self::Integer => <i32 as ToSql>::accepts(ty),
            Self::BigInt => <i64 as ToSql>::accepts(ty),
            Self::Character | Self::CharacterVarying => <String as ToSql>::accepts(ty),
            Self::Boolean => <bool as ToSql>::accepts(ty),
            Self::Date => <NaiveDate as ToSql>::accepts(ty),
        }
    }
}

impl FromStr for DeclaredType {
    type Err = CrudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A statement parameter produced by the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    Integer(i32),
    BigInt(i64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    /// SQL NULL carrying the type it stands in for.
    Null(DeclaredType),
}

impl BoundValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(_))
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::Null(_) => f.write_str("NULL"),
        }
    }
}

impl ToSql for BoundValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Integer(v) => v.to_sql(ty, out),
            Self::BigInt(v) => v.to_sql(ty, out),
            Self::Text(v) => v.to_sql(ty, out),
            Self::Boolean(v) => v.to_sql(ty, out),
            Self::Date(v) => v.to_sql(ty, out),
            Self::Null(_) => Ok(IsNull::Yes),
        }
    }

    // The variant decides; see `to_sql_checked`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Integer(v) => v.to_sql_checked(ty, out),
            Self::BigInt(v) => v.to_sql_checked(ty, out),
            Self::Text(v) => v.to_sql_checked(ty, out),
            Self::Boolean(v) => v.to_sql_checked(ty, out),
            Self::Date(v) => v.to_sql_checked(ty, out),
            Self::Null(declared) => {
                if declared.accepts(ty) {
                    Ok(IsNull::Yes)
                } else {
                    Err(format!("cannot bind a {declared} NULL to a {ty} parameter").into())
                }
            }
        }
    }
}

/// Resolve `declared_type` and bind `raw` in one step.
///
/// An unknown type fails with [`CrudError::UnsupportedType`] regardless of the
/// value.
pub fn bind(declared_type: &str, raw: &str) -> CrudResult<BoundValue> {
    DeclaredType::parse(declared_type)?.bind(raw)
}

/// Like [`bind`], with `None` producing a typed NULL.
pub fn bind_value(declared_type: &str, raw: Option<&str>) -> CrudResult<BoundValue> {
    let ty = DeclaredType::parse(declared_type)?;
    match raw {
        Some(raw) => ty.bind(raw),
        None => Ok(ty.bind_null()),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_date(raw: &str) -> CrudResult<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(CrudError::format("date", raw, "expected YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| CrudError::format("date", raw, e.to_string()))
}
