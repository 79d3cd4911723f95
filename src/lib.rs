//! rust-aseddl: Schema-diff DDL generation for Sybase ASE
//!
//! This library turns database models into ASE DDL: creating and dropping
//! whole schemas, and altering a current schema into a desired one while
//! working around what ASE cannot change in place.

pub mod alter;
pub mod ddl;
pub mod error;
pub mod model;

use std::path::PathBuf;

use anyhow::Result;

pub use alter::{ColumnChange, ColumnChangeKind, ModelComparator, TableChange};
pub use ddl::{AseDdlBuilder, BuilderOptions};
pub use error::AseDdlError;
pub use model::{Column, Database, ForeignKey, Index, Table, TypeCode};

/// The kind of script to generate
#[derive(Debug, Clone)]
pub enum ScriptKind {
    /// Create every table of a model
    Create { model_path: PathBuf },
    /// Drop every table of a model
    Drop { model_path: PathBuf },
    /// Alter the current model into the desired one
    Alter {
        current_path: PathBuf,
        desired_path: PathBuf,
        /// Where to write the current model after the alter
        write_model_path: Option<PathBuf>,
    },
}

/// Options for generating a DDL script
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub kind: ScriptKind,
    /// Output path for the script; stdout when absent
    pub output_path: Option<PathBuf>,
    pub builder_options: BuilderOptions,
    /// Enable verbose output
    pub verbose: bool,
}

/// Generate a DDL script from model files
pub fn generate_script(options: &GenerateOptions) -> Result<String> {
    let builder = AseDdlBuilder::new(options.builder_options.clone());
    let mut ddl = String::new();

    match &options.kind {
        ScriptKind::Create { model_path } => {
            let database = read_model(model_path, options.verbose)?;
            builder.create_tables(&database, &mut ddl)?;
        }
        ScriptKind::Drop { model_path } => {
            let database = read_model(model_path, options.verbose)?;
            builder.drop_tables(&database, &mut ddl);
        }
        ScriptKind::Alter {
            current_path,
            desired_path,
            write_model_path,
        } => {
            let mut current = read_model(current_path, options.verbose)?;
            let desired = read_model(desired_path, options.verbose)?;

            let changes =
                ModelComparator::new(builder.case_sensitive()).compare(&current, &desired);
            if options.verbose {
                eprintln!("Found {} changes", changes.len());
                for change in &changes {
                    eprintln!("  {} on {}", change.kind(), change.table_name());
                }
            }

            builder.process_changes(&mut current, &desired, changes, &mut ddl)?;

            if let Some(path) = write_model_path {
                model::write_database(&current, path)?;
                if options.verbose {
                    eprintln!("Wrote model: {}", path.display());
                }
            }
        }
    }

    if let Some(path) = &options.output_path {
        std::fs::write(path, &ddl)?;
        if options.verbose {
            eprintln!("Wrote script: {}", path.display());
        }
    }

    Ok(ddl)
}

fn read_model(path: &std::path::Path, verbose: bool) -> Result<Database> {
    let database = model::read_database(path)?;
    if verbose {
        eprintln!(
            "Read model {} with {} tables",
            path.display(),
            database.tables.len()
        );
    }
    Ok(database)
}
