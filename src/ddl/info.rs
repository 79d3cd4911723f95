//! ASE dialect information and the native type map

use std::collections::HashMap;

use crate::error::{AseDdlError, Result};
use crate::model::{Column, TypeCode};

/// Marks where the size clause goes inside a native type spelling
pub const SIZE_PLACEHOLDER: &str = "{0}";

/// Dialect capabilities and the type map of Sybase ASE
#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub max_identifier_length: usize,
    pub null_as_default_value_required: bool,
    pub comment_prefix: &'static str,
    pub comment_suffix: &'static str,
    pub non_blank_char_column_space_padded: bool,
    pub blank_char_column_space_padded: bool,
    pub char_column_space_trimmed: bool,
    pub empty_string_nulled: bool,
    pub auto_increment_update_allowed: bool,
    pub requires_auto_commit_for_ddl: bool,
    pub generated_columns_supported: bool,
    pub date_overrides_to_timestamp: bool,
    pub primary_key_embedded: bool,
    pub foreign_keys_embedded: bool,
    pub indices_embedded: bool,
    pub unique_embedded: bool,
    native_types: HashMap<TypeCode, &'static str>,
    default_sizes: HashMap<TypeCode, u32>,
    max_sizes: HashMap<&'static str, u32>,
    has_size: HashMap<TypeCode, bool>,
}

impl DatabaseInfo {
    /// Dialect information for Sybase ASE
    pub fn ase() -> Self {
        let mut native_types = HashMap::new();
        for (type_code, native) in [
            (TypeCode::Array, "IMAGE"),
            (TypeCode::BigInt, "NUMERIC(18,0)"),
            // BIT cannot be NULL or indexed on ASE
            (TypeCode::Bit, "SMALLINT"),
            (TypeCode::Blob, "IMAGE"),
            (TypeCode::Clob, "TEXT"),
            (TypeCode::Date, "DATETIME"),
            (TypeCode::Distinct, "IMAGE"),
            (TypeCode::Double, "DOUBLE PRECISION"),
            (TypeCode::Float, "DOUBLE PRECISION"),
            (TypeCode::Integer, "NUMERIC(12,0)"),
            (TypeCode::JavaObject, "IMAGE"),
            (TypeCode::LongVarBinary, "IMAGE"),
            (TypeCode::LongVarChar, "TEXT"),
            (TypeCode::LongNVarChar, "TEXT"),
            (TypeCode::NClob, "TEXT"),
            (TypeCode::SqlXml, "TEXT"),
            (TypeCode::Null, "IMAGE"),
            (TypeCode::Other, "IMAGE"),
            (TypeCode::Ref, "IMAGE"),
            (TypeCode::Struct, "IMAGE"),
            (TypeCode::Time, "DATETIME"),
            (TypeCode::TimeTz, "DATETIME"),
            (TypeCode::Timestamp, "DATETIME"),
            (TypeCode::TimestampTz, "DATETIME"),
            (TypeCode::TimestampLtz, "DATETIME"),
            (TypeCode::TinyInt, "SMALLINT"),
            (TypeCode::Boolean, "SMALLINT"),
            (TypeCode::Datalink, "IMAGE"),
            // Types ASE spells the same way
            (TypeCode::SmallInt, "SMALLINT"),
            (TypeCode::Real, "REAL"),
            (TypeCode::Numeric, "NUMERIC"),
            (TypeCode::Decimal, "DECIMAL"),
            (TypeCode::Char, "CHAR"),
            (TypeCode::VarChar, "VARCHAR"),
            (TypeCode::NChar, "NCHAR"),
            (TypeCode::NVarChar, "NVARCHAR"),
            (TypeCode::Binary, "BINARY"),
            (TypeCode::VarBinary, "VARBINARY"),
        ] {
            native_types.insert(type_code, native);
        }

        let default_sizes = HashMap::from([
            (TypeCode::Binary, 254),
            (TypeCode::VarBinary, 254),
            (TypeCode::Char, 254),
            (TypeCode::VarChar, 254),
        ]);

        let max_sizes = HashMap::from([
            ("DATETIME", 3),
            ("TIME", 3),
            ("BIGDATETIME", 6),
            ("BIGTIME", 6),
        ]);

        let has_size = HashMap::from([
            (TypeCode::Char, true),
            (TypeCode::VarChar, true),
            (TypeCode::NChar, true),
            (TypeCode::NVarChar, true),
            (TypeCode::Binary, true),
            (TypeCode::VarBinary, true),
            (TypeCode::Clob, false),
        ]);

        Self {
            max_identifier_length: 128,
            null_as_default_value_required: true,
            comment_prefix: "/*",
            comment_suffix: "*/",
            non_blank_char_column_space_padded: true,
            blank_char_column_space_padded: true,
            char_column_space_trimmed: false,
            empty_string_nulled: false,
            auto_increment_update_allowed: false,
            requires_auto_commit_for_ddl: true,
            generated_columns_supported: true,
            date_overrides_to_timestamp: true,
            primary_key_embedded: true,
            foreign_keys_embedded: false,
            indices_embedded: false,
            unique_embedded: true,
            native_types,
            default_sizes,
            max_sizes,
            has_size,
        }
    }

    /// Native spelling mapped to a type code, if any
    pub fn native_type_for(&self, type_code: TypeCode) -> Option<&'static str> {
        self.native_types.get(&type_code).copied()
    }

    pub fn default_size(&self, type_code: TypeCode) -> Option<u32> {
        self.default_sizes.get(&type_code).copied()
    }

    pub fn has_size(&self, type_code: TypeCode) -> bool {
        self.has_size.get(&type_code).copied().unwrap_or(false)
    }

    pub fn has_precision_and_scale(&self, type_code: TypeCode) -> bool {
        matches!(type_code, TypeCode::Numeric | TypeCode::Decimal)
    }

    /// Largest size a native type accepts, e.g. 3 for `DATETIME`
    pub fn resolve_max_size(&self, native_type: &str) -> Option<u32> {
        let bare = native_type
            .split(['(', '{'])
            .next()
            .unwrap_or(native_type)
            .trim()
            .to_uppercase();
        self.max_sizes.get(bare.as_str()).copied()
    }

    /// The native type of a column without its size clause.
    ///
    /// A platform override on the column wins over the type map.
    pub fn native_type(&self, column: &Column) -> Result<String> {
        if let Some(native) = column.native_type.as_deref().filter(|n| !n.trim().is_empty()) {
            return Ok(native.to_string());
        }
        self.native_type_for(column.type_code)
            .map(str::to_string)
            .ok_or_else(|| AseDdlError::UnmappedType {
                column: column.name.clone(),
                type_code: column.type_code.to_string(),
            })
    }

    /// The native type cut at its size placeholder.
    ///
    /// Used to decide whether copying a column needs a conversion.
    pub fn bare_native_type(&self, column: &Column) -> Result<String> {
        let native = self.native_type(column)?;
        Ok(match native.find(SIZE_PLACEHOLDER) {
            Some(pos) => native[..pos].to_string(),
            None => native,
        })
    }

    /// The full SQL type of a column including its size clause
    pub fn resolve_native_type(&self, column: &Column) -> Result<String> {
        let native = self.native_type(column)?;
        let size_clause = self.size_clause(column, &native);

        Ok(match native.find(SIZE_PLACEHOLDER) {
            Some(pos) => format!(
                "{}{}{}",
                &native[..pos],
                size_clause.unwrap_or_default(),
                &native[pos + SIZE_PLACEHOLDER.len()..]
            ),
            None if column.native_type.is_some() => native,
            None => format!("{}{}", native, size_clause.unwrap_or_default()),
        })
    }

    fn size_clause(&self, column: &Column, native: &str) -> Option<String> {
        let type_code = column.type_code;
        if self.has_precision_and_scale(type_code) {
            let size = column.size?;
            return Some(match column.scale {
                Some(scale) => format!("({},{})", size, scale),
                None => format!("({})", size),
            });
        }

        if !self.has_size(type_code) && !native.contains(SIZE_PLACEHOLDER) {
            return None;
        }
        let mut size = column.size.or_else(|| self.default_size(type_code))?;
        if let Some(max) = self.resolve_max_size(native) {
            size = size.min(max);
        }
        Some(format!("({})", size))
    }
}

impl Default for DatabaseInfo {
    fn default() -> Self {
        Self::ase()
    }
}
