use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Regression command line arguments.
#[derive(Parser, Debug)]
#[command(name = "regression")]
#[command(about = "Dump, restore and compare golden copy regression data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dump every master of a database to a directory or `.zip` archive
    Dump {
        /// SQLite database holding the masters
        #[arg(long, value_name = "PATH")]
        db: PathBuf,

        /// Destination directory, or archive when it ends in `.zip`
        #[arg(short, long, value_name = "PATH")]
        output: PathBuf,

        /// Earlier dump whose id mappings keep file names stable
        /// (defaults to the destination itself)
        #[arg(long, value_name = "PATH")]
        previous: Option<PathBuf>,
    },

    /// Restore a dump into an empty database
    Restore {
        /// Dump directory or `.zip` archive
        #[arg(short, long, value_name = "PATH")]
        input: PathBuf,

        /// SQLite database to restore into, created if missing
        #[arg(long, value_name = "PATH")]
        db: PathBuf,
    },

    /// Compare two golden copies and print a difference report
    Compare {
        /// Golden copy holding the expected results
        #[arg(long, value_name = "FILE")]
        base: PathBuf,

        /// Golden copy holding the results under test
        #[arg(long, value_name = "FILE")]
        test: PathBuf,

        /// Absolute tolerance for numeric values
        #[arg(long)]
        delta: Option<f64>,

        /// Also report equal values whose properties differ
        #[arg(long)]
        properties: bool,

        /// Write the report to this file as well
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Print the contents of a golden copy
    Show {
        #[arg(long, value_name = "FILE")]
        golden_copy: PathBuf,
    },
}
