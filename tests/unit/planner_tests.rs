//! Table structure change planning

use pretty_assertions::assert_eq;
use rust_aseddl::{
    AseDdlBuilder, Column, ColumnChangeKind, Database, Table, TableChange, TypeCode,
};

use crate::common::{normalized, position, statements};

fn table_t() -> Table {
    Table::new("T").with_column(Column::new("a", TypeCode::Integer))
}

fn run(
    current: &mut Database,
    desired: &Database,
    changes: Vec<TableChange>,
) -> (String, Vec<TableChange>) {
    let mut out = String::new();
    let remaining = AseDdlBuilder::default()
        .process_table_structure_changes(current, desired, "T", changes, &mut out)
        .expect("planning failed");
    (out, remaining)
}

#[test]
fn test_add_column_at_end() {
    let new_column = Column::new("b", TypeCode::VarChar).with_size(10).required();
    let mut current = Database::new("db").with_table(table_t());
    let desired = Database::new("db").with_table(table_t().with_column(new_column.clone()));

    let (out, remaining) = run(
        &mut current,
        &desired,
        vec![TableChange::add_column_at_end("T", new_column)],
    );

    assert!(remaining.is_empty());
    assert_eq!(statements(&out), vec!["ALTER TABLE T ADD b VARCHAR(10) NOT NULL"]);
    assert_eq!(current, desired);
}

#[test]
fn test_add_column_not_at_end_is_left_for_rebuild() {
    let new_column = Column::new("b", TypeCode::VarChar).with_size(10).required();
    let mut current = Database::new("db").with_table(table_t());
    let desired = current.clone();
    let change = TableChange::AddColumn {
        table: "T".to_string(),
        column: new_column,
        previous_column: None,
        next_column: Some("a".to_string()),
        at_end: false,
    };

    let (out, remaining) = run(&mut current, &desired, vec![change.clone()]);

    assert_eq!(remaining, vec![change]);
    assert!(!out.contains("ALTER TABLE"));
    assert_eq!(current.tables[0].columns.len(), 1);
}

#[test]
fn test_drop_primary_key() {
    let table = table_t().with_primary_key(&["a"]);
    let mut current = Database::new("db").with_table(table.clone());
    let desired = current.clone();

    let (out, remaining) = run(
        &mut current,
        &desired,
        vec![TableChange::RemovePrimaryKey {
            table: "T".to_string(),
            columns: vec!["a".to_string()],
        }],
    );

    assert!(remaining.is_empty());
    assert!(out.starts_with("BEGIN\n"));
    assert!(out.contains("WHILE EXISTS(SELECT si.name"));
    assert!(out.contains("WHERE so.name = 'T' AND so.id = si.id AND (si.status & 2048) > 0)"));

    let declare = out
        .lines()
        .find(|line| line.trim_start().starts_with("DECLARE"))
        .expect("no DECLARE line");
    let re = regex::Regex::new(
        r"^  DECLARE @tn([0-9a-f_]{48}) nvarchar\(60\), @cn([0-9a-f_]{48}) nvarchar\(60\)$",
    )
    .unwrap();
    let caps = re.captures(declare).expect("unexpected DECLARE line");
    assert_ne!(&caps[1], &caps[2]);
    assert!(out.contains(&format!(
        "EXEC ('ALTER TABLE '+@tn{}+' DROP CONSTRAINT '+@cn{})",
        &caps[1], &caps[2]
    )));
    assert!(!current.tables[0].has_primary_key());
}

#[test]
fn test_default_only_change() {
    let mut current = Database::new("db").with_table(
        Table::new("T").with_column(Column::new("a", TypeCode::Integer).with_default("0")),
    );
    let desired = Database::new("db").with_table(
        Table::new("T").with_column(Column::new("a", TypeCode::Integer).with_default("7")),
    );

    let (out, _) = run(
        &mut current,
        &desired,
        vec![TableChange::column_change(
            "T",
            "a",
            ColumnChangeKind::DefaultValue(Some("7".to_string())),
        )],
    );

    assert_eq!(statements(&out), vec!["ALTER TABLE T REPLACE a DEFAULT 7"]);
    assert_eq!(current, desired);
}

#[test]
fn test_type_change_with_default() {
    let mut current = Database::new("db").with_table(
        Table::new("T").with_column(Column::new("a", TypeCode::Integer).with_default("0")),
    );
    let desired = Database::new("db").with_table(
        Table::new("T").with_column(Column::new("a", TypeCode::BigInt).with_default("1")),
    );

    let (out, remaining) = run(
        &mut current,
        &desired,
        vec![
            TableChange::column_change("T", "a", ColumnChangeKind::DataType(TypeCode::BigInt)),
            TableChange::column_change(
                "T",
                "a",
                ColumnChangeKind::DefaultValue(Some("1".to_string())),
            ),
        ],
    );

    assert!(remaining.is_empty());
    assert_eq!(
        statements(&out),
        vec![
            "ALTER TABLE T REPLACE a DEFAULT NULL",
            "ALTER TABLE T MODIFY a NUMERIC(18,0) NULL",
            "ALTER TABLE T REPLACE a DEFAULT 1",
        ]
    );
    assert_eq!(current, desired);
}

#[test]
fn test_modify_without_default_change_keeps_default() {
    let mut current = Database::new("db").with_table(
        Table::new("T").with_column(
            Column::new("a", TypeCode::VarChar)
                .with_size(10)
                .with_default("x"),
        ),
    );
    let desired = Database::new("db").with_table(
        Table::new("T").with_column(
            Column::new("a", TypeCode::VarChar)
                .with_size(20)
                .with_default("x"),
        ),
    );

    let (out, _) = run(
        &mut current,
        &desired,
        vec![TableChange::column_change(
            "T",
            "a",
            ColumnChangeKind::Size {
                size: Some(20),
                scale: None,
            },
        )],
    );

    assert_eq!(statements(&out), vec!["ALTER TABLE T MODIFY a VARCHAR(20) NULL"]);
    assert_eq!(current, desired);
}

#[test]
fn test_removed_default_is_replaced_by_null() {
    let mut current = Database::new("db").with_table(
        Table::new("T").with_column(Column::new("a", TypeCode::Integer).with_default("3")),
    );
    let desired = Database::new("db").with_table(
        Table::new("T").with_column(Column::new("a", TypeCode::Integer).required()),
    );

    let (out, _) = run(
        &mut current,
        &desired,
        vec![
            TableChange::column_change("T", "a", ColumnChangeKind::Required),
            TableChange::column_change("T", "a", ColumnChangeKind::DefaultValue(None)),
        ],
    );

    assert_eq!(
        statements(&out),
        vec![
            "ALTER TABLE T REPLACE a DEFAULT NULL",
            "ALTER TABLE T MODIFY a NUMERIC(12,0) NOT NULL",
            "ALTER TABLE T REPLACE a DEFAULT NULL",
        ]
    );
    assert_eq!(current, desired);
}

#[test]
fn test_auto_increment_change_aborts_in_place_planning() {
    let mut current = Database::new("db").with_table(table_t());
    let desired = current.clone();
    let changes = vec![
        TableChange::column_change("T", "a", ColumnChangeKind::DataType(TypeCode::BigInt)),
        TableChange::column_change("T", "a", ColumnChangeKind::AutoIncrement),
        TableChange::column_change("T", "a", ColumnChangeKind::Required),
    ];

    let (out, remaining) = run(&mut current, &desired, changes.clone());

    assert!(out.is_empty());
    assert_eq!(remaining, changes);
    assert_eq!(current.tables[0], table_t());
}

#[test]
fn test_removals_run_before_a_rebuild_is_requested() {
    let mut current = Database::new("db")
        .with_table(table_t().with_column(Column::new("gone", TypeCode::Integer)));
    let desired = current.clone();

    let (out, remaining) = run(
        &mut current,
        &desired,
        vec![
            TableChange::column_change("T", "a", ColumnChangeKind::AutoIncrement),
            TableChange::RemoveColumn {
                table: "T".to_string(),
                column: "gone".to_string(),
            },
        ],
    );

    assert_eq!(normalized(&out), "ALTER TABLE T DROP gone;");
    assert_eq!(remaining.len(), 1);
    assert_eq!(current.tables[0].columns.len(), 1);
}

#[test]
fn test_changes_see_earlier_changes() {
    let mut current = Database::new("db").with_table(table_t());
    let desired = Database::new("db").with_table(
        table_t().with_column(Column::new("b", TypeCode::Integer).with_default("5")),
    );

    let (out, _) = run(
        &mut current,
        &desired,
        vec![
            TableChange::add_column_at_end("T", Column::new("b", TypeCode::Integer)),
            TableChange::column_change(
                "T",
                "b",
                ColumnChangeKind::DefaultValue(Some("5".to_string())),
            ),
        ],
    );

    let add = position(&out, "ADD b NUMERIC(12,0) NULL");
    let replace = position(&out, "REPLACE b DEFAULT 5");
    assert!(add < replace);
    assert_eq!(current, desired);
}
