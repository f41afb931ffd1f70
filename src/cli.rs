use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// plnav - PL/SQL symbol outline and cross-file navigation
#[derive(Parser, Debug)]
#[command(name = "plnav", version, about)]
pub struct Cli {
    /// Output results as JSON Lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Workspace root searched for other files
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the symbol outline of a file
    Symbols(SymbolsArgs),

    /// Go to the definition of the word under the cursor
    Goto(GotoArgs),

    /// Jump between spec and body of the routine or package at the cursor
    Switch(PositionArgs),

    /// List members of the package qualifying the cursor word
    Complete(PositionArgs),

    /// Show the parameters of a routine
    Params(ParamsArgs),
}

#[derive(clap::Args, Debug)]
pub struct SymbolsArgs {
    /// Source file to parse
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct PositionArgs {
    /// Source file containing the cursor
    pub file: PathBuf,

    /// Cursor line (1-based)
    #[arg(long)]
    pub line: usize,

    /// Cursor column (1-based)
    #[arg(long)]
    pub col: usize,
}

#[derive(clap::Args, Debug)]
pub struct GotoArgs {
    #[command(flatten)]
    pub position: PositionArgs,

    /// Prefer the declaration (spec) over the implementation
    #[arg(long)]
    pub spec: bool,

    /// Also print the formatted documentation of the result
    #[arg(long)]
    pub doc: bool,
}

#[derive(clap::Args, Debug)]
pub struct ParamsArgs {
    /// Source file to parse
    pub file: PathBuf,

    /// Routine name (case-insensitive)
    #[arg(long)]
    pub name: String,
}

pub fn parse() -> Cli {
    Cli::parse()
}
