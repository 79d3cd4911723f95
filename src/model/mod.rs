//! Schema model: databases, tables, columns, keys and indexes

mod column;
mod constraints;
mod database;
pub mod default_value;
pub mod reader;
mod types;
pub mod writer;

pub use column::Column;
pub use constraints::{ForeignKey, Index, Reference};
pub use database::{names_match, Database, Table};
pub use default_value::DefaultValue;
pub use reader::{parse_database_xml, read_database};
pub use types::TypeCode;
pub use writer::{write_database, write_database_xml};
