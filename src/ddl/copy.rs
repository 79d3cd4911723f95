//! Copying data between tables and rebuilding tables

use super::planner::find_table;
use super::AseDdlBuilder;
use crate::alter::TableChange;
use crate::error::{AseDdlError, Result};
use crate::model::default_value::is_valid_default_value;
use crate::model::{names_match, Column, Database, ForeignKey, Table};

impl AseDdlBuilder {
    /// Expression reading `source` into `target`: the bare column when both
    /// share a native type, a `CONVERT` otherwise
    pub fn write_cast_expression(
        &self,
        source: &Column,
        target: &Column,
        out: &mut String,
    ) -> Result<()> {
        let source_type = self.info.bare_native_type(source)?;
        let target_type = self.info.bare_native_type(target)?;
        if source_type == target_type {
            self.print_identifier(&self.shorten_name(&source.name), out);
        } else {
            out.push_str("CONVERT(");
            out.push_str(&self.info.native_type(target)?);
            out.push(',');
            self.print_identifier(&self.shorten_name(&source.name), out);
            out.push(')');
        }
        Ok(())
    }

    /// `INSERT INTO target (...) SELECT ... FROM source` for the columns both
    /// tables share, bracketed by IDENTITY_INSERT when the target has an
    /// identity column. Nothing is written when they share no stored column.
    pub fn write_copy_data_statement(
        &self,
        source: &Table,
        target: &Table,
        out: &mut String,
    ) -> Result<()> {
        let pairs: Vec<(&Column, &Column)> = target
            .columns
            .iter()
            .filter(|column| !column.generated)
            .filter_map(|target_column| {
                source
                    .find_column(&target_column.name, self.case_sensitive())
                    .filter(|source_column| !source_column.generated)
                    .map(|source_column| (source_column, target_column))
            })
            .collect();
        if pairs.is_empty() {
            return Ok(());
        }

        let has_identity = !target.auto_increment_columns().is_empty();
        let target_name = self.fully_qualified_table_name(target);
        if has_identity {
            out.push_str("SET IDENTITY_INSERT ");
            out.push_str(&target_name);
            out.push_str(" ON");
            self.print_end_of_statement(out);
        }

        out.push_str("INSERT INTO ");
        out.push_str(&target_name);
        out.push_str(" (");
        for (idx, (_, target_column)) in pairs.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            self.print_identifier(&self.shorten_name(&target_column.name), out);
        }
        out.push_str(") SELECT ");
        for (idx, (source_column, target_column)) in pairs.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            self.write_cast_expression(source_column, target_column, out)?;
        }
        out.push_str(" FROM ");
        out.push_str(&self.fully_qualified_table_name(source));
        self.print_end_of_statement(out);

        if has_identity {
            out.push_str("SET IDENTITY_INSERT ");
            out.push_str(&target_name);
            out.push_str(" OFF");
            self.print_end_of_statement(out);
        }
        Ok(())
    }

    /// Re-create a table in its desired shape, keeping its data when possible.
    ///
    /// Foreign keys pointing at the table, and the table's own desired
    /// foreign keys, are dropped and queued on `pending_foreign_keys` for
    /// the caller to re-create once every table has its final columns.
    pub fn rebuild_table(
        &self,
        current: &mut Database,
        desired: &Database,
        table_name: &str,
        remaining: &[TableChange],
        pending_foreign_keys: &mut Vec<(String, ForeignKey)>,
        out: &mut String,
    ) -> Result<()> {
        let source = find_table(current, table_name)?.clone();
        let target = find_table(desired, table_name)?.clone();

        self.drop_referencing_foreign_keys(current, &source, pending_foreign_keys, out);

        if let Some(column) = unmigratable_column(remaining) {
            eprintln!(
                "Warning: Table {} cannot be migrated without losing data: required column {} has no default",
                source.name, column.name
            );
            self.print_comment(
                &format!(
                    "Table {} is re-created empty: required column {} has no default",
                    self.table_name(&source),
                    self.shorten_name(&column.name)
                ),
                out,
            );
            self.drop_table(&source, out);
            self.create_table(&target, out)?;
        } else {
            let mut temporary = target.clone();
            temporary.name = format!("{}_", target.name);
            temporary.foreign_keys.clear();
            temporary.indices.clear();
            temporary.primary_key.clear();

            self.create_temporary_table(&temporary, out)?;
            self.write_copy_data_statement(&source, &temporary, out)?;
            self.drop_table(&source, out);
            self.create_table(&target, out)?;
            self.write_copy_data_statement(&temporary, &target, out)?;
            self.drop_table(&temporary, out);
        }

        for foreign_key in &target.foreign_keys {
            pending_foreign_keys.push((target.name.clone(), foreign_key.clone()));
        }

        let mut rebuilt = target;
        rebuilt.foreign_keys.clear();
        let case_sensitive = self.case_sensitive();
        let slot = current
            .tables
            .iter_mut()
            .find(|t| names_match(&t.name, table_name, case_sensitive))
            .ok_or_else(|| AseDdlError::MissingTable {
                table: table_name.to_string(),
            })?;
        *slot = rebuilt;
        Ok(())
    }

    fn drop_referencing_foreign_keys(
        &self,
        current: &mut Database,
        rebuilt: &Table,
        pending_foreign_keys: &mut Vec<(String, ForeignKey)>,
        out: &mut String,
    ) {
        let case_sensitive = self.case_sensitive();
        let mut wrote_quotation_on = false;
        for table in &mut current.tables {
            let is_rebuilt = names_match(&table.name, &rebuilt.name, case_sensitive);
            let (dropped, kept): (Vec<ForeignKey>, Vec<ForeignKey>) =
                std::mem::take(&mut table.foreign_keys)
                    .into_iter()
                    .partition(|fk| {
                        is_rebuilt || names_match(&fk.foreign_table, &rebuilt.name, case_sensitive)
                    });
            table.foreign_keys = kept;

            for foreign_key in dropped {
                if !wrote_quotation_on {
                    self.write_quotation_on_statement(out);
                    wrote_quotation_on = true;
                }
                self.write_external_foreign_key_drop_stmt(table, &foreign_key, out);
                // The rebuilt table's own keys come back from the desired model
                if !is_rebuilt {
                    pending_foreign_keys.push((table.name.clone(), foreign_key));
                }
            }
        }
    }
}

/// A column added by the remaining changes that existing rows cannot fill
fn unmigratable_column(remaining: &[TableChange]) -> Option<&Column> {
    remaining.iter().find_map(|change| match change {
        TableChange::AddColumn { column, .. }
            if column.required
                && !column.auto_increment
                && !is_valid_default_value(column.default_value.as_deref(), column.type_code) =>
        {
            Some(column)
        }
        _ => None,
    })
}
