use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use rust_aseddl::{generate_script, BuilderOptions, GenerateOptions, ScriptKind};

#[derive(Parser)]
#[command(name = "rust-aseddl")]
#[command(author, version, about = "Schema-diff DDL generator for Sybase ASE")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate CREATE statements for every table of a model
    Create {
        /// Path to the model XML file
        #[arg(short, long)]
        model: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Generate DROP statements for every table of a model
    Drop {
        /// Path to the model XML file
        #[arg(short, long)]
        model: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Generate the statements altering a current model into a desired one
    Alter {
        /// Path to the current model XML file
        #[arg(short, long)]
        current: PathBuf,

        /// Path to the desired model XML file
        #[arg(short, long)]
        desired: PathBuf,

        /// Write the current model after the alter to this file
        #[arg(long)]
        write_model: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Output path for the script (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use delimited identifiers
    #[arg(long)]
    delimited: bool,

    /// Token placed around delimited identifiers
    #[arg(long, default_value = "")]
    delimiter_token: String,

    /// Prefix of continuation lines
    #[arg(long, default_value = "    ")]
    indent: String,

    /// Terminate statements with `go` batches instead of semicolons
    #[arg(long)]
    go: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (kind, common) = match cli.command {
        Commands::Create { model, common } => (ScriptKind::Create { model_path: model }, common),
        Commands::Drop { model, common } => (ScriptKind::Drop { model_path: model }, common),
        Commands::Alter {
            current,
            desired,
            write_model,
            common,
        } => (
            ScriptKind::Alter {
                current_path: current,
                desired_path: desired,
                write_model_path: write_model,
            },
            common,
        ),
    };

    let options = GenerateOptions {
        kind,
        output_path: common.output,
        builder_options: BuilderOptions {
            delimited_identifiers: common.delimited,
            delimiter_token: common.delimiter_token,
            indent: common.indent,
            end_of_statement: if common.go {
                "\ngo\n".to_string()
            } else {
                ";\n".to_string()
            },
        },
        verbose: common.verbose,
    };

    let ddl = generate_script(&options)?;
    if options.output_path.is_none() {
        print!("{}", ddl);
    }

    Ok(())
}
