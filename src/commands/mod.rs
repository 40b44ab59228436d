use crate::commands::split::SplitCommand;
use clap::{Parser, Subcommand};

pub mod split;

/// CLI for splitting CD-DA audio images into per-track files using CUE sheets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Split(SplitCommand),
}
