use std::{ops::Range, path::PathBuf};

use clap::{Args, Parser, Subcommand, builder::ValueParser};
use clap_stdin::MaybeStdin;
use color_eyre::{Result, eyre::eyre};

/// Turns a selected piece of text into a glossary note, linking the term back to it
///
/// The term and its definition are extracted by a language model, then written as a new note into the vault folder
/// routed from the document the text was selected on.
#[derive(Parser)]
#[cfg_attr(debug_assertions, derive(Debug))]
#[command(
    author,
    version,
    verbatim_doc_comment,
    infer_subcommands = true,
    subcommand_required = true
)]
pub struct Cli {
    /// Path of the config file to use (defaults to the `GLOSSARY_CONFIG` env variable or the user's config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to be executed
    #[command(name = "command", subcommand)]
    pub process: CliProcess,
}

#[derive(Subcommand)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum CliProcess {
    /// Defines the term described by the given text, writing a glossary note for it
    Define(DefineProcess),

    /// Prints the folder where notes for terms defined on a document would be written
    Route(RouteProcess),

    /// Prints the path of the config file
    Config(ConfigProcess),
}

/// Defines the term described by the given text
#[derive(Args, Debug)]
pub struct DefineProcess {
    /// Selected text describing the term (reads from stdin if '-')
    ///
    /// The text with the term linked to the new note is written to the standard output
    #[arg(required_unless_present = "range")]
    pub selection: Option<MaybeStdin<String>>,

    /// Path of the document the text was selected on, absolute or relative to the vault
    #[arg(short, long)]
    pub document: Option<PathBuf>,

    /// Byte range of the selection within the document, which is replaced in place
    #[arg(
        short,
        long,
        value_name = "START..END",
        requires = "document",
        conflicts_with = "selection",
        value_parser = ValueParser::new(parse_range)
    )]
    pub range: Option<Range<usize>>,

    /// Root dir of the vault (defaults to the config value)
    #[arg(long)]
    pub vault: Option<PathBuf>,
}

/// Prints the folder where notes for terms defined on a document would be written
#[derive(Args, Debug)]
pub struct RouteProcess {
    /// Path of the document, absolute or relative to the vault (if missing, the default folder is used)
    pub document: Option<PathBuf>,

    /// Root dir of the vault (defaults to the config value)
    #[arg(long)]
    pub vault: Option<PathBuf>,
}

/// Prints the path of the config file
#[derive(Args, Debug)]
pub struct ConfigProcess {
    /// Whether to also print the main values in use
    #[arg(short, long)]
    pub verbose: bool,

    /// The config file given to the command line, if any
    #[arg(skip)]
    pub config_file: Option<PathBuf>,
}

fn parse_range(range: &str) -> Result<Range<usize>> {
    let (start, end) = range
        .split_once("..")
        .ok_or_else(|| eyre!("Expected a range like START..END"))?;
    let start = start.trim().parse::<usize>()?;
    let end = end.trim().parse::<usize>()?;
    if start > end {
        return Err(eyre!("The range start can't be greater than its end"));
    }
    Ok(start..end)
}
