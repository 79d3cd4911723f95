//! DDL generation for Sybase ASE
//!
//! [`AseDdlBuilder`] writes SQL into a caller-provided `String`. Alter runs
//! work on a copy of the current model; the DDL and the updated model are
//! handed back only when every change was processed.

mod column_writer;
mod copy;
mod info;
mod planner;
mod printer;
mod table_writer;

pub use info::{DatabaseInfo, SIZE_PLACEHOLDER};
pub use planner::ColumnPlan;
pub use printer::shorten_name;

use indexmap::IndexMap;

use crate::alter::{ModelComparator, TableChange};
use crate::error::Result;
use crate::model::{Database, ForeignKey, Table};
use planner::find_table;

/// Options controlling how DDL is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Wrap identifiers in the delimiter token and switch on `quoted_identifier`
    pub delimited_identifiers: bool,
    /// Token placed around identifiers in delimited mode
    pub delimiter_token: String,
    /// Prefix of continuation lines
    pub indent: String,
    /// Written after every statement
    pub end_of_statement: String,
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            delimited_identifiers: false,
            delimiter_token: String::new(),
            indent: "    ".to_string(),
            end_of_statement: ";\n".to_string(),
        }
    }
}

/// DDL builder for Sybase ASE
#[derive(Debug, Clone, Default)]
pub struct AseDdlBuilder {
    options: BuilderOptions,
    info: DatabaseInfo,
}

impl AseDdlBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self {
            options,
            info: DatabaseInfo::ase(),
        }
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    pub fn info(&self) -> &DatabaseInfo {
        &self.info
    }

    /// Name lookups are exact only for delimited identifiers
    pub fn case_sensitive(&self) -> bool {
        self.options.delimited_identifiers
    }

    /// SQL returning the identity values generated by the last insert
    pub fn select_last_identity_values(&self, _table: &Table) -> &'static str {
        "SELECT @@IDENTITY"
    }

    /// CREATE statements for every table, then their foreign keys
    pub fn create_tables(&self, database: &Database, out: &mut String) -> Result<()> {
        let mut ddl = String::new();
        for table in &database.tables {
            self.create_table(table, &mut ddl)?;
        }
        for table in &database.tables {
            for foreign_key in &table.foreign_keys {
                self.write_external_foreign_key_create_stmt(database, table, foreign_key, &mut ddl);
            }
        }
        out.push_str(&ddl);
        Ok(())
    }

    /// Drop every foreign key, then every table in reverse order
    pub fn drop_tables(&self, database: &Database, out: &mut String) {
        for table in database.tables.iter().rev() {
            self.drop_external_foreign_keys(table, out);
        }
        for table in database.tables.iter().rev() {
            self.drop_table(table, out);
        }
    }

    /// Compare the models and write the DDL turning `current` into `desired`.
    ///
    /// On success `current` reflects the desired model.
    pub fn alter_database(
        &self,
        current: &mut Database,
        desired: &Database,
        out: &mut String,
    ) -> Result<()> {
        let changes = ModelComparator::new(self.case_sensitive()).compare(current, desired);
        self.process_changes(current, desired, changes, out)
    }

    /// Write the DDL for a list of changes.
    ///
    /// Changes are processed in this order: foreign key drops, index drops,
    /// table drops, table creation, per-table structure changes, index
    /// creation and foreign key creation. On error neither `out` nor
    /// `current` is touched.
    pub fn process_changes(
        &self,
        current: &mut Database,
        desired: &Database,
        changes: Vec<TableChange>,
        out: &mut String,
    ) -> Result<()> {
        let mut working = current.clone();
        let mut ddl = String::new();
        self.process_changes_into(&mut working, desired, changes, &mut ddl)?;
        *current = working;
        out.push_str(&ddl);
        Ok(())
    }

    fn process_changes_into(
        &self,
        current: &mut Database,
        desired: &Database,
        changes: Vec<TableChange>,
        out: &mut String,
    ) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.write_quotation_on_statement(out);

        let case_sensitive = self.case_sensitive();
        let mut remove_foreign_keys = Vec::new();
        let mut remove_indices = Vec::new();
        let mut remove_tables = Vec::new();
        let mut add_tables = Vec::new();
        let mut structure_changes: IndexMap<String, (String, Vec<TableChange>)> = IndexMap::new();
        let mut add_indices = Vec::new();
        let mut pending_foreign_keys: Vec<(String, ForeignKey)> = Vec::new();

        for change in changes {
            match change {
                TableChange::RemoveForeignKey { .. } => remove_foreign_keys.push(change),
                TableChange::RemoveIndex { .. } => remove_indices.push(change),
                TableChange::RemoveTable { .. } => remove_tables.push(change),
                TableChange::AddTable(_) => add_tables.push(change),
                TableChange::AddIndex { .. } => add_indices.push(change),
                TableChange::AddForeignKey { table, foreign_key } => {
                    pending_foreign_keys.push((table, foreign_key))
                }
                _ => {
                    let table = change.table_name().to_string();
                    let key = if case_sensitive {
                        table.clone()
                    } else {
                        table.to_ascii_lowercase()
                    };
                    structure_changes
                        .entry(key)
                        .or_insert_with(|| (table, Vec::new()))
                        .1
                        .push(change);
                }
            }
        }

        for change in &remove_foreign_keys {
            if let TableChange::RemoveForeignKey { table, foreign_key } = change {
                let table = find_table(current, table)?;
                self.write_external_foreign_key_drop_stmt(table, foreign_key, out);
            }
            change.apply(current, case_sensitive)?;
        }

        for change in &remove_indices {
            if let TableChange::RemoveIndex { table, index } = change {
                let table = find_table(current, table)?;
                self.write_external_index_drop_stmt(table, index, out);
            }
            change.apply(current, case_sensitive)?;
        }

        for change in &remove_tables {
            let table = find_table(current, change.table_name())?;
            self.drop_external_foreign_keys(table, out);
            self.drop_table(table, out);
            change.apply(current, case_sensitive)?;
        }

        for change in add_tables {
            if let TableChange::AddTable(mut table) = change {
                self.create_table(&table, out)?;
                for foreign_key in std::mem::take(&mut table.foreign_keys) {
                    pending_foreign_keys.push((table.name.clone(), foreign_key));
                }
                TableChange::AddTable(table).apply(current, case_sensitive)?;
            }
        }

        for (_, (table_name, changes)) in structure_changes {
            let remaining =
                self.process_table_structure_changes(current, desired, &table_name, changes, out)?;
            if !remaining.is_empty() {
                self.rebuild_table(
                    current,
                    desired,
                    &table_name,
                    &remaining,
                    &mut pending_foreign_keys,
                    out,
                )?;
            }
        }

        for change in &add_indices {
            if let TableChange::AddIndex { table, index } = change {
                let table = find_table(current, table)?;
                // A rebuilt table already carries its desired indexes
                if table.find_index(&index.name, case_sensitive).is_some() {
                    continue;
                }
                self.write_external_index_create_stmt(table, index, out);
            }
            change.apply(current, case_sensitive)?;
        }

        for (table_name, foreign_key) in pending_foreign_keys {
            let table = find_table(current, &table_name)?;
            if table.find_foreign_key(&foreign_key, case_sensitive).is_some() {
                continue;
            }
            self.write_external_foreign_key_create_stmt(current, table, &foreign_key, out);
            TableChange::AddForeignKey {
                table: table_name,
                foreign_key,
            }
            .apply(current, case_sensitive)?;
        }

        Ok(())
    }
}
