//! Declarative model changes
//!
//! A change describes one difference between the current and the desired
//! model. The DDL builder consumes changes in order and, after writing the
//! SQL for one, applies it to its copy of the current model so that later
//! changes resolve against the updated state.

pub mod comparator;

pub use comparator::ModelComparator;

use crate::error::{AseDdlError, Result};
use crate::model::{Column, Database, ForeignKey, Index, Table, TypeCode};

/// The attribute of a column that a [`ColumnChange`] modifies
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnChangeKind {
    /// New raw default; `None` drops the default
    DefaultValue(Option<String>),
    /// Toggles IDENTITY. ASE cannot add or remove it in place.
    AutoIncrement,
    DataType(TypeCode),
    Size { size: Option<u32>, scale: Option<u32> },
    /// Toggles NOT NULL
    Required,
    /// Platform type override; `None` falls back to the type map
    NativeType(Option<String>),
    /// Toggles the column-level UNIQUE constraint
    Unique,
    /// New computed column state. ASE cannot turn a column into a computed
    /// one or change its expression in place.
    Generated {
        generated: bool,
        definition: Option<String>,
    },
    /// Model-only; ASE stores no column comments
    Description(Option<String>),
}

/// A change to a single attribute of an existing column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChange {
    pub table: String,
    pub column: String,
    pub kind: ColumnChangeKind,
}

impl ColumnChange {
    pub fn new(table: impl Into<String>, column: impl Into<String>, kind: ColumnChangeKind) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            kind,
        }
    }

    pub fn is_default_value_change(&self) -> bool {
        matches!(self.kind, ColumnChangeKind::DefaultValue(_))
    }

    /// True when the table must be re-created to apply the change
    pub fn requires_rebuild(&self) -> bool {
        matches!(
            self.kind,
            ColumnChangeKind::AutoIncrement
                | ColumnChangeKind::Unique
                | ColumnChangeKind::Generated { .. }
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ColumnChangeKind::DefaultValue(_) => "ColumnDefaultValueChange",
            ColumnChangeKind::AutoIncrement => "ColumnAutoIncrementChange",
            ColumnChangeKind::DataType(_) => "ColumnDataTypeChange",
            ColumnChangeKind::Size { .. } => "ColumnSizeChange",
            ColumnChangeKind::Required => "ColumnRequiredChange",
            ColumnChangeKind::NativeType(_) => "ColumnNativeTypeChange",
            ColumnChangeKind::Unique => "ColumnUniqueChange",
            ColumnChangeKind::Generated { .. } => "ColumnGeneratedChange",
            ColumnChangeKind::Description(_) => "ColumnDescriptionChange",
        }
    }

    pub fn apply(&self, database: &mut Database, case_sensitive: bool) -> Result<()> {
        let column = find_table_mut(database, &self.table, case_sensitive)?
            .find_column_mut(&self.column, case_sensitive)
            .ok_or_else(|| AseDdlError::MissingColumn {
                table: self.table.clone(),
                column: self.column.clone(),
            })?;

        match &self.kind {
            ColumnChangeKind::DefaultValue(value) => column.default_value = value.clone(),
            ColumnChangeKind::AutoIncrement => column.auto_increment = !column.auto_increment,
            ColumnChangeKind::DataType(type_code) => column.type_code = *type_code,
            ColumnChangeKind::Size { size, scale } => {
                column.size = *size;
                column.scale = *scale;
            }
            ColumnChangeKind::Required => column.required = !column.required,
            ColumnChangeKind::NativeType(native_type) => column.native_type = native_type.clone(),
            ColumnChangeKind::Unique => column.unique = !column.unique,
            ColumnChangeKind::Generated {
                generated,
                definition,
            } => {
                column.generated = *generated;
                column.generated_definition = definition.clone();
            }
            ColumnChangeKind::Description(description) => {
                column.description = description.clone()
            }
        }
        Ok(())
    }
}

/// A change to the model
#[derive(Debug, Clone, PartialEq)]
pub enum TableChange {
    AddTable(Table),
    RemoveTable {
        table: String,
    },
    AddColumn {
        table: String,
        column: Column,
        /// Column the new one follows in the desired table
        previous_column: Option<String>,
        /// Existing column the new one precedes
        next_column: Option<String>,
        /// True when the column goes after every existing column
        at_end: bool,
    },
    RemoveColumn {
        table: String,
        column: String,
    },
    CopyColumnValue {
        table: String,
        source: String,
        target: String,
    },
    Column(ColumnChange),
    AddPrimaryKey {
        table: String,
        columns: Vec<String>,
    },
    RemovePrimaryKey {
        table: String,
        columns: Vec<String>,
    },
    PrimaryKeyChange {
        table: String,
        old_columns: Vec<String>,
        new_columns: Vec<String>,
    },
    AddForeignKey {
        table: String,
        foreign_key: ForeignKey,
    },
    RemoveForeignKey {
        table: String,
        foreign_key: ForeignKey,
    },
    AddIndex {
        table: String,
        index: Index,
    },
    RemoveIndex {
        table: String,
        index: Index,
    },
}

impl TableChange {
    /// Appends a column after all existing columns
    pub fn add_column_at_end(table: impl Into<String>, column: Column) -> Self {
        TableChange::AddColumn {
            table: table.into(),
            column,
            previous_column: None,
            next_column: None,
            at_end: true,
        }
    }

    pub fn column_change(
        table: impl Into<String>,
        column: impl Into<String>,
        kind: ColumnChangeKind,
    ) -> Self {
        TableChange::Column(ColumnChange::new(table, column, kind))
    }

    /// Name of the table the change targets
    pub fn table_name(&self) -> &str {
        match self {
            TableChange::AddTable(table) => &table.name,
            TableChange::Column(change) => &change.table,
            TableChange::RemoveTable { table }
            | TableChange::AddColumn { table, .. }
            | TableChange::RemoveColumn { table, .. }
            | TableChange::CopyColumnValue { table, .. }
            | TableChange::AddPrimaryKey { table, .. }
            | TableChange::RemovePrimaryKey { table, .. }
            | TableChange::PrimaryKeyChange { table, .. }
            | TableChange::AddForeignKey { table, .. }
            | TableChange::RemoveForeignKey { table, .. }
            | TableChange::AddIndex { table, .. }
            | TableChange::RemoveIndex { table, .. } => table,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TableChange::AddTable(_) => "AddTableChange",
            TableChange::RemoveTable { .. } => "RemoveTableChange",
            TableChange::AddColumn { .. } => "AddColumnChange",
            TableChange::RemoveColumn { .. } => "RemoveColumnChange",
            TableChange::CopyColumnValue { .. } => "CopyColumnValueChange",
            TableChange::Column(change) => change.kind_name(),
            TableChange::AddPrimaryKey { .. } => "AddPrimaryKeyChange",
            TableChange::RemovePrimaryKey { .. } => "RemovePrimaryKeyChange",
            TableChange::PrimaryKeyChange { .. } => "PrimaryKeyChange",
            TableChange::AddForeignKey { .. } => "AddForeignKeyChange",
            TableChange::RemoveForeignKey { .. } => "RemoveForeignKeyChange",
            TableChange::AddIndex { .. } => "AddIndexChange",
            TableChange::RemoveIndex { .. } => "RemoveIndexChange",
        }
    }

    /// Changes to the columns or primary key of an existing table
    pub fn is_structure_change(&self) -> bool {
        matches!(
            self,
            TableChange::AddColumn { .. }
                | TableChange::RemoveColumn { .. }
                | TableChange::CopyColumnValue { .. }
                | TableChange::Column(_)
                | TableChange::AddPrimaryKey { .. }
                | TableChange::RemovePrimaryKey { .. }
                | TableChange::PrimaryKeyChange { .. }
        )
    }

    /// Apply the change to a model
    pub fn apply(&self, database: &mut Database, case_sensitive: bool) -> Result<()> {
        match self {
            TableChange::AddTable(table) => {
                if database.find_table(&table.name, case_sensitive).is_none() {
                    database.tables.push(table.clone());
                }
            }
            TableChange::RemoveTable { table } => {
                find_table_mut(database, table, case_sensitive)?;
                database
                    .tables
                    .retain(|t| !crate::model::names_match(&t.name, table, case_sensitive));
            }
            TableChange::AddColumn {
                table,
                column,
                previous_column,
                next_column,
                ..
            } => {
                let target = find_table_mut(database, table, case_sensitive)?;
                let position = previous_column
                    .as_deref()
                    .and_then(|name| target.column_position(name, case_sensitive))
                    .map(|pos| pos + 1)
                    .or_else(|| {
                        next_column
                            .as_deref()
                            .and_then(|name| target.column_position(name, case_sensitive))
                    })
                    .unwrap_or(target.columns.len());
                target.columns.insert(position, column.clone());
            }
            TableChange::RemoveColumn { table, column } => {
                let target = find_table_mut(database, table, case_sensitive)?;
                let position = target
                    .column_position(column, case_sensitive)
                    .ok_or_else(|| AseDdlError::MissingColumn {
                        table: table.clone(),
                        column: column.clone(),
                    })?;
                target.columns.remove(position);
                target
                    .primary_key
                    .retain(|pk| !crate::model::names_match(pk, column, case_sensitive));
            }
            TableChange::CopyColumnValue { .. } => {}
            TableChange::Column(change) => change.apply(database, case_sensitive)?,
            TableChange::AddPrimaryKey { table, columns }
            | TableChange::PrimaryKeyChange {
                table,
                new_columns: columns,
                ..
            } => {
                find_table_mut(database, table, case_sensitive)?.primary_key = columns.clone();
            }
            TableChange::RemovePrimaryKey { table, .. } => {
                find_table_mut(database, table, case_sensitive)?
                    .primary_key
                    .clear();
            }
            TableChange::AddForeignKey { table, foreign_key } => {
                find_table_mut(database, table, case_sensitive)?
                    .foreign_keys
                    .push(foreign_key.clone());
            }
            TableChange::RemoveForeignKey { table, foreign_key } => {
                let target = find_table_mut(database, table, case_sensitive)?;
                if let Some(position) = target.find_foreign_key(foreign_key, case_sensitive) {
                    target.foreign_keys.remove(position);
                }
            }
            TableChange::AddIndex { table, index } => {
                find_table_mut(database, table, case_sensitive)?
                    .indices
                    .push(index.clone());
            }
            TableChange::RemoveIndex { table, index } => {
                find_table_mut(database, table, case_sensitive)?
                    .indices
                    .retain(|i| !crate::model::names_match(&i.name, &index.name, case_sensitive));
            }
        }
        Ok(())
    }
}

impl From<ColumnChange> for TableChange {
    fn from(value: ColumnChange) -> Self {
        TableChange::Column(value)
    }
}

fn find_table_mut<'a>(
    database: &'a mut Database,
    table: &str,
    case_sensitive: bool,
) -> Result<&'a mut Table> {
    database
        .find_table_mut(table, case_sensitive)
        .ok_or_else(|| AseDdlError::MissingTable {
            table: table.to_string(),
        })
}
