// ABOUTME: CLI argument definitions for the cloudpaste reference host
// ABOUTME: Defines the command-line interface structure using clap derive macros

use crate::media::CompressionLevel;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cloudpaste")]
#[command(about = "Paste images into markdown notes via Cloudinary", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Force colored output even when piped
    #[arg(long, global = true, conflicts_with = "no_color")]
    pub force_color: bool,

    /// Enable verbose output for debugging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload an image and link it into a note at the given line
    Paste {
        /// Image file to paste
        image: PathBuf,

        /// Markdown note to insert the link into
        #[arg(long, short, value_name = "FILE")]
        note: PathBuf,

        /// Line to insert at (1-based, defaults to the end of the note)
        #[arg(long, short, value_parser = clap::value_parser!(u32).range(1..))]
        line: Option<u32>,

        /// Public name for the upload (defaults to the note name plus a random suffix)
        #[arg(long)]
        name: Option<String>,

        /// Downsample to a quarter of the original dimensions
        #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
        downsample: bool,

        /// Compression level: none, low, medium, high
        #[arg(long, short, default_value = "none")]
        compression: CompressionLevel,

        /// Skip the interactive options dialog
        #[arg(long, short)]
        yes: bool,
    },
    /// Show the estimated size of an image after processing
    Preview {
        /// Image file to inspect
        image: PathBuf,

        /// Downsample to a quarter of the original dimensions
        #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
        downsample: bool,

        /// Compression level: none, low, medium, high
        #[arg(long, short, default_value = "none")]
        compression: CompressionLevel,
    },
    /// Manage upload settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective settings
    Show,
    /// Set a setting (cloud_name, upload_preset, folder)
    Set {
        field: String,
        value: String,
    },
}
