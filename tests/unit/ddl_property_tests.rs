//! Properties that hold for every script the builder writes

use std::collections::HashSet;

use rust_aseddl::{
    AseDdlBuilder, Column, ColumnChangeKind, Database, ForeignKey, Index, Table, TableChange,
    TypeCode,
};

use crate::common::{delimited_builder, normalized, statements};

fn current_model() -> Database {
    Database::new("shop")
        .with_table(
            Table::new("Customer")
                .with_column(Column::new("Id", TypeCode::Integer).required().auto_increment())
                .with_column(Column::new("Name", TypeCode::VarChar).with_size(40))
                .with_primary_key(&["Id"]),
        )
        .with_table(
            Table::new("Orders")
                .with_column(Column::new("Id", TypeCode::Integer).required())
                .with_column(Column::new("CustomerId", TypeCode::Integer))
                .with_column(Column::new("Total", TypeCode::Numeric).with_precision(10, 2).with_default("0"))
                .with_primary_key(&["Id"])
                .with_foreign_key({
                    let mut fk = ForeignKey::new(Some("fk_orders_customer"), "Customer")
                        .with_reference("CustomerId", "Id");
                    fk.on_delete = Some("cascade".to_string());
                    fk.on_update = Some("cascade".to_string());
                    fk
                })
                .with_index(Index::new("ix_orders_customer", false, &["CustomerId"])),
        )
}

/// Touches every kind of statement: rebuilds, key changes, column
/// changes, index and table changes
fn desired_model() -> Database {
    let mut desired = current_model();
    let customer = &mut desired.tables[0];
    customer.columns.insert(1, Column::new("Code", TypeCode::Char).with_size(4));

    let orders = &mut desired.tables[1];
    orders.columns[2] = Column::new("Total", TypeCode::Numeric)
        .with_precision(12, 2)
        .with_default("1");
    orders.columns.push(Column::new("Note", TypeCode::VarChar).with_size(80).with_default("none"));
    orders.primary_key = vec!["Id".to_string(), "CustomerId".to_string()];
    orders.indices[0] = Index::new("ux_orders_customer", true, &["CustomerId"]);

    desired.tables.push(
        Table::new("Audit")
            .with_column(Column::new("Id", TypeCode::BigInt).required().auto_increment())
            .with_column(Column::new("At", TypeCode::Timestamp).with_default("getdate()"))
            .with_column(Column::new("Flag", TypeCode::Bit).with_default("true").required())
            .with_primary_key(&["Id"])
            .with_foreign_key(
                ForeignKey::new(Some("fk_audit_customer"), "Customer").with_reference("Id", "Id"),
            ),
    );
    desired
}

fn alter_script(builder: &AseDdlBuilder) -> String {
    let mut current = current_model();
    let mut out = String::new();
    builder
        .alter_database(&mut current, &desired_model(), &mut out)
        .expect("alter failed");
    out
}

#[test]
fn test_applying_changes_matches_emitting_them() {
    let builder = AseDdlBuilder::default();
    let current = current_model();
    let changes = vec![
        TableChange::RemoveIndex {
            table: "Orders".to_string(),
            index: Index::new("ix_orders_customer", false, &["CustomerId"]),
        },
        TableChange::add_column_at_end("Orders", Column::new("Note", TypeCode::VarChar).with_size(8)),
        TableChange::column_change("Orders", "Total", ColumnChangeKind::Size { size: Some(12), scale: Some(2) }),
        TableChange::column_change("Orders", "Total", ColumnChangeKind::DefaultValue(Some("1".to_string()))),
        TableChange::PrimaryKeyChange {
            table: "Orders".to_string(),
            old_columns: vec!["Id".to_string()],
            new_columns: vec!["Id".to_string(), "CustomerId".to_string()],
        },
        TableChange::RemoveColumn {
            table: "Customer".to_string(),
            column: "Name".to_string(),
        },
    ];

    let mut folded = current.clone();
    for change in &changes {
        change.apply(&mut folded, false).unwrap();
    }

    let mut emitted = current.clone();
    let mut desired = folded.clone();
    desired.tables[1].indices.clear();
    builder
        .process_changes(&mut emitted, &desired, changes, &mut String::new())
        .unwrap();

    assert_eq!(emitted, folded);
}

#[test]
fn test_delimited_batches_start_with_quotation_on() {
    let builder = delimited_builder();

    let mut create = String::new();
    builder.create_tables(&desired_model(), &mut create).unwrap();
    let mut drop = String::new();
    builder.drop_tables(&current_model(), &mut drop);
    let alter = alter_script(&builder);

    for script in [create, drop, alter] {
        let first = script.lines().find(|l| !l.trim().is_empty()).unwrap();
        assert_eq!(first, "SET quoted_identifier on;");
    }
}

#[test]
fn test_bare_mode_never_switches_quoting() {
    assert!(!alter_script(&AseDdlBuilder::default()).contains("quoted_identifier"));
}

#[test]
fn test_no_cascade_clauses() {
    let builder = AseDdlBuilder::default();
    let mut create = String::new();
    builder.create_tables(&current_model(), &mut create).unwrap();
    for script in [create, alter_script(&builder)] {
        assert!(!script.to_uppercase().contains("CASCADE"));
        assert!(!script.to_uppercase().contains("ON DELETE"));
    }
}

#[test]
fn test_drops_are_guarded_by_sysobjects_probes() {
    let builder = AseDdlBuilder::default();
    let mut drop = String::new();
    builder.drop_tables(&current_model(), &mut drop);
    let alter = alter_script(&builder);

    let guarded: Vec<String> = statements(&drop)
        .into_iter()
        .chain(statements(&alter))
        .filter(|s| s.contains("DROP TABLE") || s.contains("DROP CONSTRAINT"))
        .collect();
    assert!(guarded.len() >= 4);
    for statement in guarded {
        assert!(
            statement.contains("dbo.sysobjects"),
            "unguarded statement: {}",
            statement
        );
    }
}

#[test]
fn test_identity_columns_have_no_nullability() {
    let builder = AseDdlBuilder::default();
    let table = Table::new("T");
    for type_code in [TypeCode::Integer, TypeCode::BigInt, TypeCode::Numeric, TypeCode::SmallInt] {
        for required in [true, false] {
            let mut column = Column::new("id", type_code).auto_increment();
            column.required = required;
            let mut clause = String::new();
            builder.write_column(&table, &column, &mut clause).unwrap();
            assert!(clause.contains("IDENTITY"));
            assert!(!clause.contains("NULL"), "clause {}", clause);
        }
    }
}

#[test]
fn test_identity_insert_brackets_copies_into_identity_tables() {
    let script = alter_script(&AseDdlBuilder::default());
    let statements = statements(&script);

    let copies: Vec<usize> = statements
        .iter()
        .enumerate()
        .filter(|(_, s)| s.starts_with("INSERT INTO"))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(copies.len(), 2, "expected a rebuild of Customer:\n{}", script);

    for idx in copies {
        let target = statements[idx]
            .trim_start_matches("INSERT INTO ")
            .split(' ')
            .next()
            .unwrap()
            .to_string();
        assert_eq!(statements[idx - 1], format!("SET IDENTITY_INSERT {} ON", target));
        assert_eq!(statements[idx + 1], format!("SET IDENTITY_INSERT {} OFF", target));
    }
}

#[test]
fn test_modify_never_carries_a_default() {
    let script = alter_script(&AseDdlBuilder::default());
    let modifies: Vec<String> = statements(&script)
        .into_iter()
        .filter(|s| s.contains(" MODIFY "))
        .collect();
    assert!(!modifies.is_empty());
    for statement in modifies {
        assert!(!statement.contains("DEFAULT"), "{}", statement);
    }
}

#[test]
fn test_unique_identifiers() {
    let builder = AseDdlBuilder::default();
    let re = regex::Regex::new(r"^[0-9a-f_]{48}$").unwrap();
    let mut seen = HashSet::new();
    for _ in 0..1_000_000 {
        let id = builder.create_unique_identifier();
        assert!(re.is_match(&id));
        assert!(seen.insert(id));
    }
}

#[test]
fn test_alter_reaches_desired_model() {
    for builder in [AseDdlBuilder::default(), delimited_builder()] {
        let mut current = current_model();
        let desired = desired_model();
        builder
            .alter_database(&mut current, &desired, &mut String::new())
            .unwrap();

        assert_eq!(current.tables.len(), desired.tables.len());
        for table in &desired.tables {
            let actual = current.find_table(&table.name, true).unwrap();
            assert_eq!(actual.columns, table.columns);
            assert_eq!(actual.primary_key, table.primary_key);
            assert_eq!(actual.indices, table.indices);
            assert_eq!(actual.foreign_keys.len(), table.foreign_keys.len());
            for fk in &table.foreign_keys {
                assert!(actual.find_foreign_key(fk, true).is_some());
            }
        }
    }
}

#[test]
fn test_alter_reaches_desired_column_definitions() {
    let current = Database::new("db").with_table(
        Table::new("Tag")
            .with_column(Column::new("id", TypeCode::Integer).required())
            .with_column(Column::new("code", TypeCode::VarChar).with_size(5))
            .with_column(Column::new("twice", TypeCode::Integer).with_generated("id + 1"))
            .with_column(Column::new("at", TypeCode::Timestamp))
            .with_primary_key(&["id"]),
    );

    let mut unique = current.clone();
    unique.tables[0].columns[1].unique = true;
    let mut computed = current.clone();
    computed.tables[0].columns[2].generated_definition = Some("id * 2".to_string());
    let mut native = current.clone();
    native.tables[0].columns[3].native_type = Some("BIGDATETIME".to_string());

    for (desired, expected) in [
        (unique, "code VARCHAR(5) UNIQUE NULL"),
        (computed, "twice COMPUTE id * 2"),
        (native, "MODIFY at BIGDATETIME NULL"),
    ] {
        for builder in [AseDdlBuilder::default(), delimited_builder()] {
            let mut working = current.clone();
            let mut out = String::new();
            builder
                .alter_database(&mut working, &desired, &mut out)
                .unwrap();

            assert_eq!(working, desired);
            if !builder.case_sensitive() {
                assert!(normalized(&out).contains(expected), "missing {:?} in:\n{}", expected, out);
            }
        }
    }
}
