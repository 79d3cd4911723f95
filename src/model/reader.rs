//! Reader for database model XML files
//!
//! Models use the `<database>/<table>/<column>` layout of DdlUtils schema
//! files, which is also what the upstream synchronization platform stores.

use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::WINDOWS_1252;
use roxmltree::{Document, Node};

use super::{Column, Database, ForeignKey, Index, Reference, Table, TypeCode};
use crate::error::AseDdlError;

/// Read a model file from disk
pub fn read_database(path: &Path) -> Result<Database> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| AseDdlError::ModelReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(parse_document(&content, path)?)
}

/// Parse model XML held in memory
pub fn parse_database_xml(content: &str) -> crate::error::Result<Database> {
    parse_document(content, &PathBuf::from("<inline>"))
}

/// Read a file as a string, trying UTF-8 first, then Windows-1252 as fallback
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(err) => {
            let bytes = err.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

fn parse_document(content: &str, path: &Path) -> crate::error::Result<Database> {
    let doc = Document::parse(content).map_err(|e| AseDdlError::ModelParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "database" {
        return Err(invalid(format!(
            "expected <database> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut database = Database::new(root.attribute("name").unwrap_or_default());
    for node in element_children(&root, "table") {
        database.tables.push(parse_table(&node)?);
    }

    Ok(database)
}

fn parse_table(node: &Node) -> crate::error::Result<Table> {
    let mut table = Table::new(required_attribute(node, "name")?);
    table.catalog = optional_attribute(node, "catalog");
    table.schema = optional_attribute(node, "schema");
    table.description = optional_attribute(node, "description");

    for column_node in element_children(node, "column") {
        let column = parse_column(&column_node)?;
        if bool_attribute(&column_node, "primaryKey")? {
            table.primary_key.push(column.name.clone());
        }
        table.columns.push(column);
    }

    for fk_node in element_children(node, "foreign-key") {
        let mut foreign_key = ForeignKey::new(
            optional_attribute(&fk_node, "name").as_deref(),
            required_attribute(&fk_node, "foreignTable")?,
        );
        foreign_key.on_delete = optional_attribute(&fk_node, "onDelete");
        foreign_key.on_update = optional_attribute(&fk_node, "onUpdate");
        for reference in element_children(&fk_node, "reference") {
            foreign_key.references.push(Reference {
                local_column: required_attribute(&reference, "local")?,
                foreign_column: required_attribute(&reference, "foreign")?,
            });
        }
        table.foreign_keys.push(foreign_key);
    }

    for (tag, column_tag, unique) in [
        ("index", "index-column", false),
        ("unique", "unique-column", true),
    ] {
        for index_node in element_children(node, tag) {
            let mut index = Index {
                name: required_attribute(&index_node, "name")?,
                unique: unique || bool_attribute(&index_node, "unique")?,
                columns: Vec::new(),
            };
            for column in element_children(&index_node, column_tag) {
                index.columns.push(required_attribute(&column, "name")?);
            }
            table.indices.push(index);
        }
    }

    Ok(table)
}

fn parse_column(node: &Node) -> crate::error::Result<Column> {
    let name = required_attribute(node, "name")?;
    let type_name = required_attribute(node, "type")?;
    let type_code: TypeCode = type_name
        .parse()
        .map_err(|message: String| invalid(format!("column {}: {}", name, message)))?;

    let mut column = Column::new(name, type_code);
    if let Some(size) = optional_attribute(node, "size") {
        let (size, scale) = parse_size(&size)
            .ok_or_else(|| invalid(format!("column {}: invalid size '{}'", column.name, size)))?;
        column.size = Some(size);
        column.scale = scale;
    }

    column.required = bool_attribute(node, "required")?;
    column.auto_increment = bool_attribute(node, "autoIncrement")?;
    column.unique = bool_attribute(node, "unique")?;
    column.generated = bool_attribute(node, "generated")?;
    // An empty default attribute is a real (empty string) default
    column.default_value = node.attribute("default").map(str::to_string);
    column.generated_definition = optional_attribute(node, "generatedDefinition");
    column.native_type = optional_attribute(node, "nativeType");
    column.description = optional_attribute(node, "description");

    Ok(column)
}

/// Parse `10` or `10,2`
fn parse_size(size: &str) -> Option<(u32, Option<u32>)> {
    match size.split_once(',') {
        Some((size, scale)) => Some((size.trim().parse().ok()?, Some(scale.trim().parse().ok()?))),
        None => Some((size.trim().parse().ok()?, None)),
    }
}

fn element_children<'a, 'input>(
    node: &Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn required_attribute(node: &Node, name: &str) -> crate::error::Result<String> {
    optional_attribute(node, name).ok_or_else(|| {
        invalid(format!(
            "<{}> is missing required attribute '{}'",
            node.tag_name().name(),
            name
        ))
    })
}

fn optional_attribute(node: &Node, name: &str) -> Option<String> {
    node.attribute(name)
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

fn bool_attribute(node: &Node, name: &str) -> crate::error::Result<bool> {
    match node.attribute(name) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(invalid(format!(
            "attribute '{}' of <{}> must be true or false, found '{}'",
            name,
            node.tag_name().name(),
            v
        ))),
    }
}

fn invalid(message: String) -> AseDdlError {
    AseDdlError::InvalidModelFormat { message }
}
