//! Foreign keys and indexes

/// One local/foreign column pair of a foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub local_column: String,
    pub foreign_column: String,
}

/// A foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Constraint name; a name is derived from the table when absent
    pub name: Option<String>,
    pub foreign_table: String,
    pub references: Vec<Reference>,
    /// Referential actions are kept in the model but ASE cannot express them
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ForeignKey {
    pub fn new(name: Option<&str>, foreign_table: impl Into<String>) -> Self {
        Self {
            name: name.map(str::to_string),
            foreign_table: foreign_table.into(),
            references: Vec::new(),
            on_delete: None,
            on_update: None,
        }
    }

    pub fn with_reference(
        mut self,
        local_column: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        self.references.push(Reference {
            local_column: local_column.into(),
            foreign_column: foreign_column.into(),
        });
        self
    }

    /// Structural equality ignoring the constraint name
    pub fn same_definition(&self, other: &ForeignKey, case_sensitive: bool) -> bool {
        let eq = |a: &str, b: &str| {
            if case_sensitive {
                a == b
            } else {
                a.eq_ignore_ascii_case(b)
            }
        };
        eq(&self.foreign_table, &other.foreign_table)
            && self.references.len() == other.references.len()
            && self.references.iter().zip(&other.references).all(|(a, b)| {
                eq(&a.local_column, &b.local_column) && eq(&a.foreign_column, &b.foreign_column)
            })
    }
}

/// A table index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, unique: bool, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            unique,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}
