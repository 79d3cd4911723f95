//! Identifier, literal and statement printing

use uuid::Uuid;

use super::AseDdlBuilder;
use crate::model::Table;

const QUOTATION_ON: &str = "SET quoted_identifier on";

impl AseDdlBuilder {
    /// Append an identifier, wrapped in the delimiter token in delimited mode
    pub fn print_identifier(&self, identifier: &str, out: &mut String) {
        out.push_str(&self.delimited_identifier(identifier));
    }

    pub fn delimited_identifier(&self, identifier: &str) -> String {
        if self.options.delimited_identifiers {
            let token = &self.options.delimiter_token;
            format!("{}{}{}", token, identifier, token)
        } else {
            identifier.to_string()
        }
    }

    /// Append an identifier wrapped in single quotes regardless of the
    /// delimiter mode, for lookups by name in the system tables
    pub fn print_always_single_quoted_identifier(&self, identifier: &str, out: &mut String) {
        out.push('\'');
        out.push_str(identifier);
        out.push('\'');
    }

    pub fn print_indent(&self, out: &mut String) {
        out.push_str(&self.options.indent);
    }

    pub fn println(&self, text: &str, out: &mut String) {
        out.push_str(text);
        out.push('\n');
    }

    pub fn print_end_of_statement(&self, out: &mut String) {
        out.push_str(&self.options.end_of_statement);
        out.push('\n');
    }

    /// Comment using the dialect comment delimiters
    pub fn print_comment(&self, text: &str, out: &mut String) {
        out.push_str(self.info.comment_prefix);
        out.push(' ');
        out.push_str(text);
        out.push(' ');
        out.push_str(self.info.comment_suffix);
        out.push('\n');
    }

    /// The statement enabling delimited identifiers; empty in bare mode
    pub fn quotation_on_statement(&self) -> &'static str {
        if self.options.delimited_identifiers {
            QUOTATION_ON
        } else {
            ""
        }
    }

    pub fn write_quotation_on_statement(&self, out: &mut String) {
        let statement = self.quotation_on_statement();
        if !statement.is_empty() {
            out.push_str(statement);
            self.print_end_of_statement(out);
        }
    }

    /// A 48 character identifier of lowercase hex digits and underscores
    pub fn create_unique_identifier(&self) -> String {
        let first = Uuid::new_v4().simple().to_string();
        let second = Uuid::new_v4().simple().to_string();
        format!("{}_{}", first, &second[..15])
    }

    /// Shorten a name to the identifier max length
    pub fn shorten_name(&self, name: &str) -> String {
        shorten_name(name, self.info.max_identifier_length)
    }

    pub fn table_name(&self, table: &Table) -> String {
        self.shorten_name(&table.name)
    }

    /// `catalog.schema.table` with the table name shortened. ASE rejects
    /// delimiters around the catalog, so it is always written bare.
    pub fn fully_qualified_table_name(&self, table: &Table) -> String {
        let mut name = String::new();
        if let Some(catalog) = table.catalog.as_deref().filter(|c| !c.trim().is_empty()) {
            name.push_str(catalog);
            name.push('.');
        }
        if let Some(schema) = table.schema.as_deref().filter(|s| !s.trim().is_empty()) {
            name.push_str(&self.delimited_identifier(schema));
            name.push('.');
        }
        name.push_str(&self.delimited_identifier(&self.table_name(table)));
        name
    }

    /// `ALTER TABLE <name>` followed by the indent of the clause line
    pub fn write_table_alter_stmt(&self, table: &Table, out: &mut String) {
        out.push_str("ALTER TABLE ");
        self.println(&self.fully_qualified_table_name(table), out);
        self.print_indent(out);
    }
}

/// Cut the middle out of a name longer than `max_length` characters,
/// joining the two ends with `_`.
pub fn shorten_name(name: &str, max_length: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if max_length == 0 || chars.len() <= max_length {
        return name.to_string();
    }

    let head = max_length / 2;
    let tail = max_length - head - 1;
    let mut result: String = chars[..head].iter().collect();
    result.push('_');
    result.extend(&chars[chars.len() - tail..]);
    result
}
