//! Script generation from model files

use pretty_assertions::assert_eq;
use rust_aseddl::model::read_database;
use rust_aseddl::{generate_script, BuilderOptions, GenerateOptions, ScriptKind};

use crate::common::{load_fixture, normalized, position, statements, TestContext};

fn options(kind: ScriptKind) -> GenerateOptions {
    GenerateOptions {
        kind,
        output_path: None,
        builder_options: BuilderOptions::default(),
        verbose: false,
    }
}

fn alter_kind(ctx: &TestContext, current: &str, desired: &str, write_model: bool) -> ScriptKind {
    ScriptKind::Alter {
        current_path: ctx.path(current),
        desired_path: ctx.path(desired),
        write_model_path: write_model.then(|| ctx.path("after.xml")),
    }
}

#[test]
fn test_create_script() {
    let ctx = TestContext::with_fixtures(&["inventory_desired.xml"]);
    let ddl = generate_script(&options(ScriptKind::Create {
        model_path: ctx.path("inventory_desired.xml"),
    }))
    .unwrap();

    let statements = statements(&ddl);
    assert_eq!(
        statements[0],
        "CREATE TABLE Supplier( Id NUMERIC(12,0) IDENTITY, Name VARCHAR(60) NOT NULL, Phone VARCHAR(20) NULL, PRIMARY KEY (Id) )"
    );
    assert!(statements.contains(&"CREATE UNIQUE INDEX ux_item_label ON Item (Label)".to_string()));
    assert!(statements.contains(
        &"CREATE TABLE Warehouse( Id NUMERIC(12,0) NOT NULL, City VARCHAR(40) DEFAULT 'Berlin' NULL, Opened DATETIME DEFAULT getdate() NULL, PRIMARY KEY (Id) )"
            .to_string()
    ));
    assert_eq!(
        statements.last().unwrap(),
        "ALTER TABLE Item ADD CONSTRAINT fk_item_supplier FOREIGN KEY (SupplierId) REFERENCES Supplier (Id)"
    );
}

#[test]
fn test_drop_script() {
    let ctx = TestContext::with_fixtures(&["inventory_current.xml"]);
    let ddl = generate_script(&options(ScriptKind::Drop {
        model_path: ctx.path("inventory_current.xml"),
    }))
    .unwrap();

    let drop_fk = position(&ddl, "DROP CONSTRAINT fk_item_supplier");
    let drop_legacy = position(&ddl, "DROP TABLE Legacy END");
    let drop_item = position(&ddl, "DROP TABLE Item END");
    let drop_supplier = position(&ddl, "DROP TABLE Supplier END");
    assert!(drop_fk < drop_legacy);
    assert!(drop_legacy < drop_item);
    assert!(drop_item < drop_supplier);
}

#[test]
fn test_alter_script_in_place() {
    let ctx = TestContext::with_fixtures(&["inventory_current.xml", "inventory_desired.xml"]);
    let ddl = generate_script(&options(alter_kind(
        &ctx,
        "inventory_current.xml",
        "inventory_desired.xml",
        false,
    )))
    .unwrap();

    let expected = vec![
        "DROP INDEX Item.ix_item_label",
        "IF EXISTS (SELECT 1 FROM dbo.sysobjects WHERE type = 'U' AND name = 'Legacy') BEGIN DROP TABLE Legacy END",
        "CREATE TABLE Warehouse( Id NUMERIC(12,0) NOT NULL, City VARCHAR(40) DEFAULT 'Berlin' NULL, Opened DATETIME DEFAULT getdate() NULL, PRIMARY KEY (Id) )",
        "ALTER TABLE Supplier ADD Phone VARCHAR(20) NULL",
        "ALTER TABLE Item ADD Price NUMERIC(10,2) NULL",
        "ALTER TABLE Item MODIFY Label VARCHAR(60) NULL",
        "ALTER TABLE Item REPLACE Qty DEFAULT 7",
        "CREATE UNIQUE INDEX ux_item_label ON Item (Label)",
    ];
    assert_eq!(statements(&ddl), expected);
}

#[test]
fn test_alter_writes_updated_model() {
    let ctx = TestContext::with_fixtures(&["inventory_current.xml", "inventory_desired.xml"]);
    generate_script(&options(alter_kind(
        &ctx,
        "inventory_current.xml",
        "inventory_desired.xml",
        true,
    )))
    .unwrap();

    let written = read_database(&ctx.path("after.xml")).unwrap();
    assert_eq!(written, load_fixture("inventory_desired.xml"));
}

#[test]
fn test_alter_rebuilds_table_for_identity_change() {
    let ctx = TestContext::with_fixtures(&["ledger_current.xml", "ledger_desired.xml"]);
    let ddl = generate_script(&options(alter_kind(
        &ctx,
        "ledger_current.xml",
        "ledger_desired.xml",
        true,
    )))
    .unwrap();

    let drop_fk = position(&ddl, "DROP CONSTRAINT fk_entry_account");
    let temp = position(&ddl, "CREATE TABLE Account_(");
    let fill = position(&ddl, "INSERT INTO Account_ (Id,Owner) SELECT Id,Owner FROM Account");
    let recreate = position(&ddl, "CREATE TABLE Account(");
    let copy_back = position(
        &ddl,
        "INSERT INTO Account (Id,Number,Owner) SELECT Id,Number,Owner FROM Account_",
    );
    let add_fk = position(&ddl, "ADD CONSTRAINT fk_entry_account FOREIGN KEY (AccountId)");
    assert!(drop_fk < temp);
    assert!(temp < fill);
    assert!(fill < recreate);
    assert!(recreate < copy_back);
    assert!(copy_back < add_fk);
    assert!(normalized(&ddl).contains("SET IDENTITY_INSERT Account ON; INSERT INTO Account"));

    let written = read_database(&ctx.path("after.xml")).unwrap();
    assert_eq!(written, load_fixture("ledger_desired.xml"));
}

#[test]
fn test_go_terminated_output_file() {
    let ctx = TestContext::with_fixtures(&["inventory_current.xml", "inventory_desired.xml"]);
    let mut options = options(alter_kind(
        &ctx,
        "inventory_current.xml",
        "inventory_desired.xml",
        false,
    ));
    options.output_path = Some(ctx.path("alter.sql"));
    options.builder_options.end_of_statement = "\ngo\n".to_string();

    let ddl = generate_script(&options).unwrap();
    assert_eq!(ctx.read("alter.sql"), ddl);
    assert!(ddl.starts_with("DROP INDEX Item.ix_item_label\ngo\n\n"));
    assert!(!ddl.contains(';'));
}

#[test]
fn test_missing_model_fails() {
    let ctx = TestContext::with_fixtures(&[]);
    let result = generate_script(&options(ScriptKind::Create {
        model_path: ctx.path("missing.xml"),
    }));
    assert!(result.is_err());
}
