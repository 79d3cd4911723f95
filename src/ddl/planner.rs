//! Planning of table structure changes
//!
//! ASE can add columns only at the end of a table, cannot put a DEFAULT in
//! `ALTER TABLE ... MODIFY` and cannot add or remove IDENTITY. The planner
//! applies what it can in place, in three passes:
//!
//! 1. drop primary keys
//! 2. add, remove and modify columns
//! 3. add primary keys
//!
//! Whatever it cannot apply is handed back so the caller can rebuild the table.

use indexmap::IndexMap;

use super::AseDdlBuilder;
use crate::alter::{ColumnChange, ColumnChangeKind, TableChange};
use crate::error::{AseDdlError, Result};
use crate::model::{Column, Database, Table};

/// Outcome of the column pass
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnPlan {
    /// Changes per column, keyed by the column name normalized under the
    /// identifier mode, in order of first appearance
    InPlace(IndexMap<String, Vec<ColumnChange>>),
    /// The table has to be re-created
    Rebuild,
}

impl AseDdlBuilder {
    /// Write the DDL for the structure changes of one table.
    ///
    /// `current` is updated after every statement. The returned changes
    /// could not be applied in place and require a table rebuild; an empty
    /// result means the table is done.
    pub fn process_table_structure_changes(
        &self,
        current: &mut Database,
        desired: &Database,
        table_name: &str,
        changes: Vec<TableChange>,
        out: &mut String,
    ) -> Result<Vec<TableChange>> {
        if let Some(change) = changes.iter().find(|c| !c.is_structure_change()) {
            return Err(AseDdlError::UnsupportedChange {
                kind: change.kind().to_string(),
            });
        }
        if changes.is_empty() {
            return Ok(changes);
        }

        self.write_quotation_on_statement(out);

        let changes = self.drop_primary_keys(current, changes, out)?;
        let (plan, mut remaining) = self.plan_column_changes(current, changes, out)?;

        match plan {
            // Pass 3 is skipped: the rebuild re-creates the primary key
            ColumnPlan::Rebuild => return Ok(remaining),
            ColumnPlan::InPlace(buckets) => {
                remaining.retain(|c| !matches!(c, TableChange::Column(_)));
                self.flush_column_changes(current, desired, table_name, buckets, out)?;
            }
        }

        // Columns still missing; the rebuild re-creates the primary key
        if remaining.iter().any(|c| !is_primary_key_addition(c)) {
            return Ok(remaining);
        }
        self.add_primary_keys(current, remaining, out)
    }

    fn drop_primary_keys(
        &self,
        current: &mut Database,
        changes: Vec<TableChange>,
        out: &mut String,
    ) -> Result<Vec<TableChange>> {
        let mut remaining = Vec::with_capacity(changes.len());
        for change in changes {
            match &change {
                TableChange::RemovePrimaryKey { .. } => {
                    self.process_remove_primary_key(current, &change, out)?;
                }
                TableChange::PrimaryKeyChange {
                    table, old_columns, ..
                } => {
                    let remove = TableChange::RemovePrimaryKey {
                        table: table.clone(),
                        columns: old_columns.clone(),
                    };
                    self.process_remove_primary_key(current, &remove, out)?;
                    remaining.push(change);
                }
                _ => remaining.push(change),
            }
        }
        Ok(remaining)
    }

    fn plan_column_changes(
        &self,
        current: &mut Database,
        changes: Vec<TableChange>,
        out: &mut String,
    ) -> Result<(ColumnPlan, Vec<TableChange>)> {
        let mut buckets: IndexMap<String, Vec<ColumnChange>> = IndexMap::new();
        let mut rebuild = false;
        let mut remaining = Vec::new();

        for change in changes {
            match &change {
                TableChange::AddColumn { at_end: true, .. } => {
                    self.process_add_column(current, &change, out)?;
                }
                TableChange::CopyColumnValue { .. } => {
                    self.process_copy_column_value(current, &change, out)?;
                }
                TableChange::RemoveColumn { .. } => {
                    self.process_remove_column(current, &change, out)?;
                }
                TableChange::Column(ColumnChange {
                    kind: ColumnChangeKind::Description(_),
                    ..
                }) => {
                    change.apply(current, self.case_sensitive())?;
                }
                TableChange::Column(column_change) => {
                    if column_change.requires_rebuild() {
                        rebuild = true;
                        buckets.clear();
                    } else if !rebuild {
                        buckets
                            .entry(self.column_key(&column_change.column))
                            .or_default()
                            .push(column_change.clone());
                    }
                    remaining.push(change);
                }
                _ => remaining.push(change),
            }
        }

        let plan = if rebuild {
            ColumnPlan::Rebuild
        } else {
            ColumnPlan::InPlace(buckets)
        };
        Ok((plan, remaining))
    }

    fn flush_column_changes(
        &self,
        current: &mut Database,
        desired: &Database,
        table_name: &str,
        buckets: IndexMap<String, Vec<ColumnChange>>,
        out: &mut String,
    ) -> Result<()> {
        let case_sensitive = self.case_sensitive();
        for (_, column_changes) in buckets {
            match column_changes.as_slice() {
                [only] if only.is_default_value_change() => {
                    self.process_default_value_change(current, only, out)?;
                }
                [first, ..] => {
                    let source_table = find_table(current, table_name)?;
                    let source_column = find_column(source_table, &first.column, case_sensitive)?;
                    let target_table = find_table(desired, table_name)?;
                    let target_column = find_column(target_table, &first.column, case_sensitive)?;
                    self.process_column_change(source_table, source_column, target_column, out)?;
                }
                [] => continue,
            }
            for change in &column_changes {
                change.apply(current, case_sensitive)?;
            }
        }
        Ok(())
    }

    fn add_primary_keys(
        &self,
        current: &mut Database,
        changes: Vec<TableChange>,
        out: &mut String,
    ) -> Result<Vec<TableChange>> {
        let mut remaining = Vec::new();
        for change in changes {
            let columns = match &change {
                TableChange::AddPrimaryKey { columns, .. } => Some(columns.clone()),
                TableChange::PrimaryKeyChange { new_columns, .. } => Some(new_columns.clone()),
                _ => None,
            };
            let Some(columns) = columns else {
                remaining.push(change);
                continue;
            };
            let table = find_table(current, change.table_name())?;
            self.write_external_primary_key_create_stmt(table, &columns, out);
            change.apply(current, self.case_sensitive())?;
        }
        Ok(remaining)
    }

    fn process_add_column(
        &self,
        current: &mut Database,
        change: &TableChange,
        out: &mut String,
    ) -> Result<()> {
        if let TableChange::AddColumn { table, column, .. } = change {
            let table = find_table(current, table)?;
            self.write_table_alter_stmt(table, out);
            out.push_str("ADD ");
            self.write_column(table, column, out)?;
            self.print_end_of_statement(out);
        }
        change.apply(current, self.case_sensitive())
    }

    fn process_remove_column(
        &self,
        current: &mut Database,
        change: &TableChange,
        out: &mut String,
    ) -> Result<()> {
        if let TableChange::RemoveColumn { table, column } = change {
            let table = find_table(current, table)?;
            self.write_table_alter_stmt(table, out);
            out.push_str("DROP ");
            self.print_identifier(&self.shorten_name(column), out);
            self.print_end_of_statement(out);
        }
        change.apply(current, self.case_sensitive())
    }

    fn process_copy_column_value(
        &self,
        current: &Database,
        change: &TableChange,
        out: &mut String,
    ) -> Result<()> {
        if let TableChange::CopyColumnValue {
            table,
            source,
            target,
        } = change
        {
            let table = find_table(current, table)?;
            out.push_str("UPDATE ");
            out.push_str(&self.fully_qualified_table_name(table));
            out.push_str(" SET ");
            self.print_identifier(&self.shorten_name(target), out);
            out.push('=');
            self.print_identifier(&self.shorten_name(source), out);
            self.print_end_of_statement(out);
        }
        Ok(())
    }

    /// Drops the primary key through its backing index. ASE primary keys
    /// have no stable name, so the constraint name is looked up at run time.
    fn process_remove_primary_key(
        &self,
        current: &mut Database,
        change: &TableChange,
        out: &mut String,
    ) -> Result<()> {
        let table = find_table(current, change.table_name())?;
        let table_name = self.table_name(table);
        let table_var = format!("tn{}", self.create_unique_identifier());
        let constraint_var = format!("cn{}", self.create_unique_identifier());

        self.println("BEGIN", out);
        self.println(
            &format!(
                "  DECLARE @{} nvarchar(60), @{} nvarchar(60)",
                table_var, constraint_var
            ),
            out,
        );
        self.println("  WHILE EXISTS(SELECT si.name", out);
        self.println("                 FROM dbo.sysindexes si, dbo.sysobjects so", out);
        out.push_str("                 WHERE so.name = ");
        self.print_always_single_quoted_identifier(&table_name, out);
        self.println(" AND so.id = si.id AND (si.status & 2048) > 0)", out);
        self.println("  BEGIN", out);
        self.println(
            &format!(
                "    SELECT @{} = so.name, @{} = si.name",
                table_var, constraint_var
            ),
            out,
        );
        self.println("      FROM dbo.sysindexes si, dbo.sysobjects so", out);
        out.push_str("      WHERE so.name = ");
        self.print_always_single_quoted_identifier(&table_name, out);
        self.println(" AND so.id = si.id AND (si.status & 2048) > 0", out);
        self.println(
            &format!(
                "    EXEC ('ALTER TABLE '+@{}+' DROP CONSTRAINT '+@{})",
                table_var, constraint_var
            ),
            out,
        );
        self.println("  END", out);
        out.push_str("END");
        self.print_end_of_statement(out);

        change.apply(current, self.case_sensitive())
    }

    /// Change only the default of a column with `REPLACE ... DEFAULT`
    fn process_default_value_change(
        &self,
        current: &Database,
        change: &ColumnChange,
        out: &mut String,
    ) -> Result<()> {
        let new_default = match &change.kind {
            ColumnChangeKind::DefaultValue(value) => value.clone(),
            _ => None,
        };
        let table = find_table(current, &change.table)?;
        let column = find_column(table, &change.column, self.case_sensitive())?;

        self.write_table_alter_stmt(table, out);
        out.push_str("REPLACE ");
        self.print_identifier(&self.shorten_name(&column.name), out);
        out.push_str(" DEFAULT ");

        let mut with_default = column.clone();
        with_default.default_value = new_default;
        if crate::model::default_value::is_valid_default_value(
            with_default.default_value.as_deref(),
            column.type_code,
        ) {
            let value = self.native_default_value(&with_default).unwrap_or_default();
            self.print_default_value(&value, &with_default, out);
        } else {
            out.push_str("NULL");
        }
        self.print_end_of_statement(out);
        Ok(())
    }

    /// `MODIFY` a column to its target definition. The default is stripped
    /// before and restored after, as MODIFY cannot carry one.
    fn process_column_change(
        &self,
        source_table: &Table,
        source_column: &Column,
        target_column: &Column,
        out: &mut String,
    ) -> Result<()> {
        let default_changes =
            source_column.parsed_default_value() != target_column.parsed_default_value();
        let column_name = self.shorten_name(&source_column.name);

        if default_changes {
            self.write_table_alter_stmt(source_table, out);
            out.push_str("REPLACE ");
            self.print_identifier(&column_name, out);
            out.push_str(" DEFAULT NULL");
            self.print_end_of_statement(out);
        }

        let mut without_default = target_column.clone();
        without_default.default_value = None;
        self.write_table_alter_stmt(source_table, out);
        out.push_str("MODIFY ");
        self.write_column(source_table, &without_default, out)?;
        self.print_end_of_statement(out);

        if default_changes {
            self.write_table_alter_stmt(source_table, out);
            out.push_str("REPLACE ");
            self.print_identifier(&column_name, out);
            let mut default_clause = String::new();
            self.write_column_default_value_stmt(target_column, &mut default_clause);
            if default_clause.is_empty() {
                out.push_str(" DEFAULT NULL");
            } else {
                out.push_str(&default_clause);
            }
            self.print_end_of_statement(out);
        }
        Ok(())
    }

    /// Key of a column in the per-column buckets, folded the same way
    /// [`crate::model::names_match`] compares names
    fn column_key(&self, name: &str) -> String {
        if self.case_sensitive() {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        }
    }
}

fn is_primary_key_addition(change: &TableChange) -> bool {
    matches!(
        change,
        TableChange::AddPrimaryKey { .. } | TableChange::PrimaryKeyChange { .. }
    )
}

pub(crate) fn find_table<'a>(database: &'a Database, name: &str) -> Result<&'a Table> {
    database
        .find_table(name, true)
        .or_else(|| database.find_table(name, false))
        .ok_or_else(|| AseDdlError::MissingTable {
            table: name.to_string(),
        })
}

fn find_column<'a>(table: &'a Table, name: &str, case_sensitive: bool) -> Result<&'a Column> {
    table
        .find_column(name, case_sensitive)
        .ok_or_else(|| AseDdlError::MissingColumn {
            table: table.name.clone(),
            column: name.to_string(),
        })
}
