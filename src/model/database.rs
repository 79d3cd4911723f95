//! Database and table model

use super::{Column, ForeignKey, Index};

/// Compare two object names. Without delimited identifiers ASE folds names,
/// so lookups are case-insensitive.
pub fn names_match(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

/// A named collection of tables
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Database {
    pub name: String,
    pub tables: Vec<Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn find_table(&self, name: &str, case_sensitive: bool) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| names_match(&t.name, name, case_sensitive))
    }

    pub fn find_table_mut(&mut self, name: &str, case_sensitive: bool) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| names_match(&t.name, name, case_sensitive))
    }
}

/// A database table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Columns in table order
    pub columns: Vec<Column>,
    /// Primary key column names in key order; empty when there is no key
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indices: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
            description: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indices.push(index);
        self
    }

    pub fn find_column(&self, name: &str, case_sensitive: bool) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| names_match(&c.name, name, case_sensitive))
    }

    pub fn find_column_mut(&mut self, name: &str, case_sensitive: bool) -> Option<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| names_match(&c.name, name, case_sensitive))
    }

    pub fn column_position(&self, name: &str, case_sensitive: bool) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| names_match(&c.name, name, case_sensitive))
    }

    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    pub fn is_primary_key_column(&self, name: &str, case_sensitive: bool) -> bool {
        self.primary_key
            .iter()
            .any(|pk| names_match(pk, name, case_sensitive))
    }

    /// Primary key columns in key order. Names without a matching column are skipped.
    pub fn primary_key_columns(&self) -> Vec<&Column> {
        self.primary_key
            .iter()
            .filter_map(|name| self.find_column(name, true).or_else(|| self.find_column(name, false)))
            .collect()
    }

    pub fn auto_increment_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.auto_increment).collect()
    }

    pub fn find_foreign_key(&self, foreign_key: &ForeignKey, case_sensitive: bool) -> Option<usize> {
        self.foreign_keys.iter().position(|fk| match (&fk.name, &foreign_key.name) {
            (Some(a), Some(b)) => names_match(a, b, case_sensitive),
            _ => fk.same_definition(foreign_key, case_sensitive),
        })
    }

    pub fn find_index(&self, name: &str, case_sensitive: bool) -> Option<&Index> {
        self.indices
            .iter()
            .find(|i| names_match(&i.name, name, case_sensitive))
    }
}
