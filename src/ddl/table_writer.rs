//! Tables, primary keys, foreign keys and indexes

use super::AseDdlBuilder;
use crate::error::Result;
use crate::model::{Database, ForeignKey, Index, Table};

impl AseDdlBuilder {
    /// CREATE TABLE with the primary key embedded, followed by the table's indexes
    pub fn create_table(&self, table: &Table, out: &mut String) -> Result<()> {
        self.write_quotation_on_statement(out);
        self.write_table_creation_stmt(table, out)?;
        for index in &table.indices {
            self.write_external_index_create_stmt(table, index, out);
        }
        Ok(())
    }

    /// CREATE TABLE without keys or indexes, used for rebuild copies
    pub(crate) fn create_temporary_table(&self, table: &Table, out: &mut String) -> Result<()> {
        let mut temporary = table.clone();
        temporary.primary_key.clear();
        temporary.foreign_keys.clear();
        temporary.indices.clear();
        for column in &mut temporary.columns {
            column.unique = false;
        }
        self.write_quotation_on_statement(out);
        self.write_table_creation_stmt(&temporary, out)
    }

    fn write_table_creation_stmt(&self, table: &Table, out: &mut String) -> Result<()> {
        out.push_str("CREATE TABLE ");
        out.push_str(&self.fully_qualified_table_name(table));
        self.println("(", out);

        for (idx, column) in table.columns.iter().enumerate() {
            self.print_indent(out);
            self.write_column(table, column, out)?;
            if idx + 1 < table.columns.len() {
                self.println(",", out);
            }
        }

        if self.info.primary_key_embedded && table.has_primary_key() {
            self.println(",", out);
            self.print_indent(out);
            self.write_primary_key_stmt(&table.primary_key, out);
        }
        out.push('\n');
        out.push(')');
        self.print_end_of_statement(out);
        Ok(())
    }

    fn write_primary_key_stmt(&self, columns: &[String], out: &mut String) {
        out.push_str("PRIMARY KEY (");
        self.write_column_list(columns, out);
        out.push(')');
    }

    fn write_column_list(&self, columns: &[String], out: &mut String) {
        for (idx, column) in columns.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            self.print_identifier(&self.shorten_name(column), out);
        }
    }

    /// Guarded DROP TABLE
    pub fn drop_table(&self, table: &Table, out: &mut String) {
        self.write_quotation_on_statement(out);
        out.push_str("IF EXISTS (SELECT 1 FROM dbo.sysobjects WHERE type = 'U' AND name = ");
        self.print_always_single_quoted_identifier(&self.table_name(table), out);
        self.println(")", out);
        self.println("BEGIN", out);
        self.print_indent(out);
        out.push_str("DROP TABLE ");
        out.push_str(&self.fully_qualified_table_name(table));
        out.push_str(" END");
        self.print_end_of_statement(out);
    }

    /// Name of the primary key constraint of a table
    pub fn primary_key_constraint_name(&self, table: &Table) -> String {
        self.shorten_name(&format!("{}_PK", table.name))
    }

    pub fn write_external_primary_key_create_stmt(
        &self,
        table: &Table,
        columns: &[String],
        out: &mut String,
    ) {
        if columns.is_empty() {
            return;
        }
        self.write_table_alter_stmt(table, out);
        out.push_str("ADD CONSTRAINT ");
        self.print_identifier(&self.primary_key_constraint_name(table), out);
        out.push(' ');
        self.write_primary_key_stmt(columns, out);
        self.print_end_of_statement(out);
    }

    /// Constraint name of a foreign key; unnamed keys get one derived from
    /// the table and the local columns
    pub fn foreign_key_name(&self, table: &Table, foreign_key: &ForeignKey) -> String {
        match foreign_key.name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(name) => self.shorten_name(name),
            None => {
                let mut name = table.name.clone();
                for reference in &foreign_key.references {
                    name.push('_');
                    name.push_str(&reference.local_column);
                }
                name.push_str("_FK");
                self.shorten_name(&name)
            }
        }
    }

    /// `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY`. ASE has no
    /// referential actions, so `on_delete` and `on_update` are not written.
    pub fn write_external_foreign_key_create_stmt(
        &self,
        database: &Database,
        table: &Table,
        foreign_key: &ForeignKey,
        out: &mut String,
    ) {
        let locals: Vec<String> = foreign_key
            .references
            .iter()
            .map(|r| r.local_column.clone())
            .collect();
        let foreigns: Vec<String> = foreign_key
            .references
            .iter()
            .map(|r| r.foreign_column.clone())
            .collect();
        let foreign_table_name = match database.find_table(&foreign_key.foreign_table, false) {
            Some(foreign_table) => self.fully_qualified_table_name(foreign_table),
            None => self.delimited_identifier(&self.shorten_name(&foreign_key.foreign_table)),
        };

        self.write_table_alter_stmt(table, out);
        out.push_str("ADD CONSTRAINT ");
        self.print_identifier(&self.foreign_key_name(table, foreign_key), out);
        out.push_str(" FOREIGN KEY (");
        self.write_column_list(&locals, out);
        out.push_str(") REFERENCES ");
        out.push_str(&foreign_table_name);
        out.push_str(" (");
        self.write_column_list(&foreigns, out);
        out.push(')');
        self.print_end_of_statement(out);
    }

    /// Guarded `ALTER TABLE ... DROP CONSTRAINT`
    pub fn write_external_foreign_key_drop_stmt(
        &self,
        table: &Table,
        foreign_key: &ForeignKey,
        out: &mut String,
    ) {
        let constraint_name = self.foreign_key_name(table, foreign_key);
        out.push_str("IF EXISTS (SELECT 1 FROM dbo.sysobjects WHERE type = 'RI' AND name = ");
        self.print_always_single_quoted_identifier(&constraint_name, out);
        self.println(")", out);
        self.print_indent(out);
        out.push_str("ALTER TABLE ");
        out.push_str(&self.fully_qualified_table_name(table));
        out.push_str(" DROP CONSTRAINT ");
        self.print_identifier(&constraint_name, out);
        self.print_end_of_statement(out);
    }

    /// Drop every foreign key of a table
    pub fn drop_external_foreign_keys(&self, table: &Table, out: &mut String) {
        if table.foreign_keys.is_empty() {
            return;
        }
        self.write_quotation_on_statement(out);
        for foreign_key in &table.foreign_keys {
            self.write_external_foreign_key_drop_stmt(table, foreign_key, out);
        }
    }

    pub fn write_external_index_create_stmt(&self, table: &Table, index: &Index, out: &mut String) {
        out.push_str("CREATE ");
        if index.unique {
            out.push_str("UNIQUE ");
        }
        out.push_str("INDEX ");
        self.print_identifier(&self.shorten_name(&index.name), out);
        out.push_str(" ON ");
        out.push_str(&self.fully_qualified_table_name(table));
        out.push_str(" (");
        self.write_column_list(&index.columns, out);
        out.push(')');
        self.print_end_of_statement(out);
    }

    /// `DROP INDEX <table>.<index>`
    pub fn write_external_index_drop_stmt(&self, table: &Table, index: &Index, out: &mut String) {
        out.push_str("DROP INDEX ");
        self.print_identifier(&self.table_name(table), out);
        out.push('.');
        self.print_identifier(&self.shorten_name(&index.name), out);
        self.print_end_of_statement(out);
    }
}
