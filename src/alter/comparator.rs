//! Derives the change list turning one model into another

use super::{ColumnChangeKind, TableChange};
use crate::model::{names_match, Column, Database, Table};

/// Compares a current model against a desired one
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelComparator {
    case_sensitive: bool,
}

impl ModelComparator {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Changes that, applied in order, turn `current` into `desired`
    pub fn compare(&self, current: &Database, desired: &Database) -> Vec<TableChange> {
        let mut changes = Vec::new();

        for desired_table in &desired.tables {
            if current.find_table(&desired_table.name, self.case_sensitive).is_none() {
                changes.push(TableChange::AddTable(desired_table.clone()));
            }
        }

        for current_table in &current.tables {
            match desired.find_table(&current_table.name, self.case_sensitive) {
                Some(desired_table) => {
                    self.compare_tables(current_table, desired_table, &mut changes)
                }
                None => {
                    for foreign_key in &current_table.foreign_keys {
                        changes.push(TableChange::RemoveForeignKey {
                            table: current_table.name.clone(),
                            foreign_key: foreign_key.clone(),
                        });
                    }
                    changes.push(TableChange::RemoveTable {
                        table: current_table.name.clone(),
                    });
                }
            }
        }

        changes
    }

    fn compare_tables(&self, current: &Table, desired: &Table, changes: &mut Vec<TableChange>) {
        let table = current.name.clone();

        for foreign_key in &current.foreign_keys {
            let kept = desired
                .find_foreign_key(foreign_key, self.case_sensitive)
                .map(|idx| &desired.foreign_keys[idx])
                .is_some_and(|fk| fk.same_definition(foreign_key, self.case_sensitive));
            if !kept {
                changes.push(TableChange::RemoveForeignKey {
                    table: table.clone(),
                    foreign_key: foreign_key.clone(),
                });
            }
        }
        for foreign_key in &desired.foreign_keys {
            let existing = current
                .find_foreign_key(foreign_key, self.case_sensitive)
                .map(|idx| &current.foreign_keys[idx])
                .is_some_and(|fk| fk.same_definition(foreign_key, self.case_sensitive));
            if !existing {
                changes.push(TableChange::AddForeignKey {
                    table: table.clone(),
                    foreign_key: foreign_key.clone(),
                });
            }
        }

        for index in &current.indices {
            if desired.find_index(&index.name, self.case_sensitive) != Some(index) {
                changes.push(TableChange::RemoveIndex {
                    table: table.clone(),
                    index: index.clone(),
                });
            }
        }
        for index in &desired.indices {
            if current.find_index(&index.name, self.case_sensitive) != Some(index) {
                changes.push(TableChange::AddIndex {
                    table: table.clone(),
                    index: index.clone(),
                });
            }
        }

        self.compare_columns(current, desired, changes);
        self.compare_primary_keys(current, desired, changes);
    }

    fn compare_columns(&self, current: &Table, desired: &Table, changes: &mut Vec<TableChange>) {
        // Column order after removals and additions so far
        let mut intermediate: Vec<String> = Vec::new();

        for column in &current.columns {
            if desired.find_column(&column.name, self.case_sensitive).is_none() {
                changes.push(TableChange::RemoveColumn {
                    table: current.name.clone(),
                    column: column.name.clone(),
                });
            } else {
                intermediate.push(column.name.clone());
            }
        }

        for (idx, column) in desired.columns.iter().enumerate() {
            if current.find_column(&column.name, self.case_sensitive).is_some() {
                continue;
            }
            let previous_column = idx.checked_sub(1).map(|i| desired.columns[i].name.clone());
            let position = previous_column
                .as_deref()
                .and_then(|prev| {
                    intermediate
                        .iter()
                        .position(|name| names_match(name, prev, self.case_sensitive))
                })
                .map_or(0, |pos| pos + 1);
            let next_column = intermediate.get(position).cloned();
            let at_end = next_column.is_none();

            intermediate.insert(position, column.name.clone());
            changes.push(TableChange::AddColumn {
                table: current.name.clone(),
                column: column.clone(),
                previous_column,
                next_column,
                at_end,
            });
        }

        for column in &current.columns {
            if let Some(target) = desired.find_column(&column.name, self.case_sensitive) {
                for kind in self.column_differences(column, target) {
                    changes.push(TableChange::column_change(&current.name, &column.name, kind));
                }
            }
        }
    }

    fn column_differences(&self, current: &Column, desired: &Column) -> Vec<ColumnChangeKind> {
        let mut kinds = Vec::new();
        if current.type_code != desired.type_code {
            kinds.push(ColumnChangeKind::DataType(desired.type_code));
        }
        if current.size != desired.size || current.scale != desired.scale {
            kinds.push(ColumnChangeKind::Size {
                size: desired.size,
                scale: desired.scale,
            });
        }
        if current.required != desired.required {
            kinds.push(ColumnChangeKind::Required);
        }
        if current.parsed_default_value() != desired.parsed_default_value()
            || current.default_value.is_some() != desired.default_value.is_some()
        {
            kinds.push(ColumnChangeKind::DefaultValue(desired.default_value.clone()));
        }
        if current.auto_increment != desired.auto_increment {
            kinds.push(ColumnChangeKind::AutoIncrement);
        }
        if current.native_type != desired.native_type {
            kinds.push(ColumnChangeKind::NativeType(desired.native_type.clone()));
        }
        if current.unique != desired.unique {
            kinds.push(ColumnChangeKind::Unique);
        }
        if current.generated != desired.generated
            || current.generated_definition != desired.generated_definition
        {
            kinds.push(ColumnChangeKind::Generated {
                generated: desired.generated,
                definition: desired.generated_definition.clone(),
            });
        }
        if current.description != desired.description {
            kinds.push(ColumnChangeKind::Description(desired.description.clone()));
        }
        kinds
    }

    fn compare_primary_keys(&self, current: &Table, desired: &Table, changes: &mut Vec<TableChange>) {
        let same = current.primary_key.len() == desired.primary_key.len()
            && current
                .primary_key
                .iter()
                .zip(&desired.primary_key)
                .all(|(a, b)| names_match(a, b, self.case_sensitive));
        if same {
            return;
        }

        let table = current.name.clone();
        changes.push(match (current.has_primary_key(), desired.has_primary_key()) {
            (false, _) => TableChange::AddPrimaryKey {
                table,
                columns: desired.primary_key.clone(),
            },
            (true, false) => TableChange::RemovePrimaryKey {
                table,
                columns: current.primary_key.clone(),
            },
            (true, true) => TableChange::PrimaryKeyChange {
                table,
                old_columns: current.primary_key.clone(),
                new_columns: desired.primary_key.clone(),
            },
        });
    }
}
