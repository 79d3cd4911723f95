//! Abstract SQL type codes
//!
//! The codes follow the JDBC type names used by model files. They describe a
//! column independent of any database; the ASE spelling is resolved by the
//! type map in [`crate::ddl::DatabaseInfo`].

use std::fmt;
use std::str::FromStr;

/// Abstract SQL type code of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    LongVarChar,
    NChar,
    NVarChar,
    LongNVarChar,
    Clob,
    NClob,
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    TimestampLtz,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
    Array,
    Distinct,
    JavaObject,
    Null,
    Other,
    Ref,
    Struct,
    Datalink,
    SqlXml,
    RowId,
}

impl TypeCode {
    /// All known type codes, in declaration order
    pub const ALL: &'static [TypeCode] = &[
        TypeCode::Bit,
        TypeCode::Boolean,
        TypeCode::TinyInt,
        TypeCode::SmallInt,
        TypeCode::Integer,
        TypeCode::BigInt,
        TypeCode::Real,
        TypeCode::Float,
        TypeCode::Double,
        TypeCode::Numeric,
        TypeCode::Decimal,
        TypeCode::Char,
        TypeCode::VarChar,
        TypeCode::LongVarChar,
        TypeCode::NChar,
        TypeCode::NVarChar,
        TypeCode::LongNVarChar,
        TypeCode::Clob,
        TypeCode::NClob,
        TypeCode::Date,
        TypeCode::Time,
        TypeCode::TimeTz,
        TypeCode::Timestamp,
        TypeCode::TimestampTz,
        TypeCode::TimestampLtz,
        TypeCode::Binary,
        TypeCode::VarBinary,
        TypeCode::LongVarBinary,
        TypeCode::Blob,
        TypeCode::Array,
        TypeCode::Distinct,
        TypeCode::JavaObject,
        TypeCode::Null,
        TypeCode::Other,
        TypeCode::Ref,
        TypeCode::Struct,
        TypeCode::Datalink,
        TypeCode::SqlXml,
        TypeCode::RowId,
    ];

    /// The type name as written in model files
    pub fn name(&self) -> &'static str {
        match self {
            TypeCode::Bit => "BIT",
            TypeCode::Boolean => "BOOLEAN",
            TypeCode::TinyInt => "TINYINT",
            TypeCode::SmallInt => "SMALLINT",
            TypeCode::Integer => "INTEGER",
            TypeCode::BigInt => "BIGINT",
            TypeCode::Real => "REAL",
            TypeCode::Float => "FLOAT",
            TypeCode::Double => "DOUBLE",
            TypeCode::Numeric => "NUMERIC",
            TypeCode::Decimal => "DECIMAL",
            TypeCode::Char => "CHAR",
            TypeCode::VarChar => "VARCHAR",
            TypeCode::LongVarChar => "LONGVARCHAR",
            TypeCode::NChar => "NCHAR",
            TypeCode::NVarChar => "NVARCHAR",
            TypeCode::LongNVarChar => "LONGNVARCHAR",
            TypeCode::Clob => "CLOB",
            TypeCode::NClob => "NCLOB",
            TypeCode::Date => "DATE",
            TypeCode::Time => "TIME",
            TypeCode::TimeTz => "TIMETZ",
            TypeCode::Timestamp => "TIMESTAMP",
            TypeCode::TimestampTz => "TIMESTAMPTZ",
            TypeCode::TimestampLtz => "TIMESTAMPLTZ",
            TypeCode::Binary => "BINARY",
            TypeCode::VarBinary => "VARBINARY",
            TypeCode::LongVarBinary => "LONGVARBINARY",
            TypeCode::Blob => "BLOB",
            TypeCode::Array => "ARRAY",
            TypeCode::Distinct => "DISTINCT",
            TypeCode::JavaObject => "JAVA_OBJECT",
            TypeCode::Null => "NULL",
            TypeCode::Other => "OTHER",
            TypeCode::Ref => "REF",
            TypeCode::Struct => "STRUCT",
            TypeCode::Datalink => "DATALINK",
            TypeCode::SqlXml => "SQLXML",
            TypeCode::RowId => "ROWID",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeCode::TinyInt
                | TypeCode::SmallInt
                | TypeCode::Integer
                | TypeCode::BigInt
                | TypeCode::Real
                | TypeCode::Float
                | TypeCode::Double
                | TypeCode::Numeric
                | TypeCode::Decimal
        )
    }

    /// Integral types whose defaults parse as `i64`
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TypeCode::TinyInt | TypeCode::SmallInt | TypeCode::Integer | TypeCode::BigInt
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            TypeCode::Char
                | TypeCode::VarChar
                | TypeCode::LongVarChar
                | TypeCode::NChar
                | TypeCode::NVarChar
                | TypeCode::LongNVarChar
                | TypeCode::Clob
                | TypeCode::NClob
                | TypeCode::SqlXml
        )
    }

    pub fn is_date_time(&self) -> bool {
        matches!(
            self,
            TypeCode::Date
                | TypeCode::Time
                | TypeCode::TimeTz
                | TypeCode::Timestamp
                | TypeCode::TimestampTz
                | TypeCode::TimestampLtz
        )
    }

    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            TypeCode::Binary | TypeCode::VarBinary | TypeCode::LongVarBinary | TypeCode::Blob
        )
    }

    /// True for BIT and BOOLEAN, whose defaults are written as SMALLINT on ASE
    pub fn is_boolean_like(&self) -> bool {
        matches!(self, TypeCode::Bit | TypeCode::Boolean)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        // A few common aliases used by hand-written model files
        let canonical = match upper.as_str() {
            "INT" => "INTEGER",
            "TIMESTAMP WITH TIME ZONE" => "TIMESTAMPTZ",
            "TIMESTAMP WITH LOCAL TIME ZONE" => "TIMESTAMPLTZ",
            "TIME WITH TIME ZONE" => "TIMETZ",
            other => other,
        };
        TypeCode::ALL
            .iter()
            .find(|code| code.name() == canonical)
            .copied()
            .ok_or_else(|| format!("Unknown type code: {}", s))
    }
}
