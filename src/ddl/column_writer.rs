//! Column clauses

use super::AseDdlBuilder;
use crate::error::Result;
use crate::model::default_value::{convert_boolean_default, is_function_call, is_valid_default_value};
use crate::model::{Column, Table};

impl AseDdlBuilder {
    /// Append the clause defining a column, as used in CREATE TABLE,
    /// `ALTER TABLE ... ADD` and `ALTER TABLE ... MODIFY`
    pub fn write_column(&self, table: &Table, column: &Column, out: &mut String) -> Result<()> {
        if column.generated {
            self.write_generated_column(table, column, out)?;
        } else {
            self.print_identifier(&self.shorten_name(&column.name), out);
            out.push(' ');
            out.push_str(&self.info.resolve_native_type(column)?);
            self.write_column_default_value_stmt(column, out);
        }

        if column.unique && self.info.unique_embedded {
            out.push_str(" UNIQUE");
        }

        // ASE rejects NULL/NOT NULL together with IDENTITY
        if column.auto_increment {
            let sql_type = self.info.resolve_native_type(column)?;
            if !sql_type.to_lowercase().contains(" identity") {
                out.push_str(" IDENTITY");
            }
        } else if !column.generated {
            if column.required {
                out.push_str(" NOT NULL");
            } else {
                out.push_str(" NULL");
            }
        }
        Ok(())
    }

    fn write_generated_column(&self, _table: &Table, column: &Column, out: &mut String) -> Result<()> {
        self.print_identifier(&self.shorten_name(&column.name), out);
        match column
            .generated_definition
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        {
            Some(definition) => {
                out.push_str(" COMPUTE ");
                out.push_str(definition);
            }
            None => {
                out.push(' ');
                out.push_str(&self.info.resolve_native_type(column)?);
                self.write_column_default_value_stmt(column, out);
            }
        }
        Ok(())
    }

    /// Append ` DEFAULT <value>` when the column has a default its type accepts
    pub fn write_column_default_value_stmt(&self, column: &Column, out: &mut String) {
        if !is_valid_default_value(column.default_value.as_deref(), column.type_code) {
            return;
        }
        if let Some(value) = self.native_default_value(column) {
            out.push_str(" DEFAULT ");
            self.print_default_value(&value, column, out);
        }
    }

    /// The default as ASE stores it; BIT and BOOLEAN defaults become SMALLINT values
    pub fn native_default_value(&self, column: &Column) -> Option<String> {
        let raw = column.default_value.as_deref()?;
        if column.type_code.is_boolean_like() {
            Some(convert_boolean_default(raw))
        } else {
            Some(raw.to_string())
        }
    }

    /// Append a default value literal, quoting it unless it is numeric, a
    /// function call or `NULL`
    pub fn print_default_value(&self, value: &str, column: &Column, out: &mut String) {
        let unquoted = column.type_code.is_numeric()
            || column.type_code.is_boolean_like()
            || is_function_call(value)
            || value.trim().eq_ignore_ascii_case("null");
        if unquoted {
            out.push_str(value);
        } else {
            out.push('\'');
            out.push_str(&value.replace('\'', "''"));
            out.push('\'');
        }
    }
}
