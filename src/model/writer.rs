//! Writer for database model XML files
//!
//! Produces the same layout [`super::reader`] accepts, so a model written
//! after an alter run can be fed back in as the next current model.

use std::io::Write;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::{Column, Database, Table};
use crate::error::AseDdlError;

/// Serialize a model to an XML string
pub fn write_database_xml(database: &Database) -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    write_database_to(&mut buffer, database)?;
    String::from_utf8(buffer).map_err(|e| {
        AseDdlError::ModelWriteError {
            message: e.to_string(),
        }
        .into()
    })
}

/// Write a model to a file
pub fn write_database(database: &Database, path: &Path) -> anyhow::Result<()> {
    let xml = write_database_xml(database)?;
    std::fs::write(path, xml).map_err(|e| AseDdlError::ModelWriteError {
        message: format!("{}: {}", path.display(), e),
    })?;
    Ok(())
}

fn write_database_to<W: Write>(writer: W, database: &Database) -> anyhow::Result<()> {
    let mut xml_writer = Writer::new_with_indent(writer, b' ', 2);

    xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("database");
    root.push_attribute(("name", database.name.as_str()));
    xml_writer.write_event(Event::Start(root))?;

    for table in &database.tables {
        write_table(&mut xml_writer, table)?;
    }

    xml_writer.write_event(Event::End(BytesEnd::new("database")))?;
    Ok(())
}

fn write_table<W: Write>(writer: &mut Writer<W>, table: &Table) -> anyhow::Result<()> {
    let mut elem = BytesStart::new("table");
    elem.push_attribute(("name", table.name.as_str()));
    push_optional(&mut elem, "catalog", table.catalog.as_deref());
    push_optional(&mut elem, "schema", table.schema.as_deref());
    push_optional(&mut elem, "description", table.description.as_deref());
    writer.write_event(Event::Start(elem))?;

    for column in &table.columns {
        let primary_key = table.primary_key.iter().any(|pk| pk == &column.name);
        write_column(writer, column, primary_key)?;
    }

    for foreign_key in &table.foreign_keys {
        let mut elem = BytesStart::new("foreign-key");
        push_optional(&mut elem, "name", foreign_key.name.as_deref());
        elem.push_attribute(("foreignTable", foreign_key.foreign_table.as_str()));
        push_optional(&mut elem, "onDelete", foreign_key.on_delete.as_deref());
        push_optional(&mut elem, "onUpdate", foreign_key.on_update.as_deref());
        writer.write_event(Event::Start(elem))?;
        for reference in &foreign_key.references {
            let elem = BytesStart::new("reference").with_attributes([
                ("local", reference.local_column.as_str()),
                ("foreign", reference.foreign_column.as_str()),
            ]);
            writer.write_event(Event::Empty(elem))?;
        }
        writer.write_event(Event::End(BytesEnd::new("foreign-key")))?;
    }

    for index in &table.indices {
        let (tag, column_tag) = if index.unique {
            ("unique", "unique-column")
        } else {
            ("index", "index-column")
        };
        let elem = BytesStart::new(tag).with_attributes([("name", index.name.as_str())]);
        writer.write_event(Event::Start(elem))?;
        for column in &index.columns {
            let elem = BytesStart::new(column_tag).with_attributes([("name", column.as_str())]);
            writer.write_event(Event::Empty(elem))?;
        }
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }

    writer.write_event(Event::End(BytesEnd::new("table")))?;
    Ok(())
}

fn write_column<W: Write>(
    writer: &mut Writer<W>,
    column: &Column,
    primary_key: bool,
) -> anyhow::Result<()> {
    let mut elem = BytesStart::new("column");
    elem.push_attribute(("name", column.name.as_str()));
    elem.push_attribute(("type", column.type_code.name()));
    let size = column.size_spec();
    push_optional(&mut elem, "size", size.as_deref());
    push_flag(&mut elem, "primaryKey", primary_key);
    push_flag(&mut elem, "required", column.required);
    push_flag(&mut elem, "autoIncrement", column.auto_increment);
    push_flag(&mut elem, "unique", column.unique);
    push_flag(&mut elem, "generated", column.generated);
    // Written even when empty: an empty default differs from no default
    if let Some(default_value) = &column.default_value {
        elem.push_attribute(("default", default_value.as_str()));
    }
    push_optional(
        &mut elem,
        "generatedDefinition",
        column.generated_definition.as_deref(),
    );
    push_optional(&mut elem, "nativeType", column.native_type.as_deref());
    push_optional(&mut elem, "description", column.description.as_deref());
    writer.write_event(Event::Empty(elem))?;
    Ok(())
}

fn push_optional(elem: &mut BytesStart, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        elem.push_attribute((name, value));
    }
}

fn push_flag(elem: &mut BytesStart, name: &str, value: bool) {
    if value {
        elem.push_attribute((name, "true"));
    }
}
