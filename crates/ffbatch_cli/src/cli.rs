use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ffbatch_core::models::OperationMode;

#[derive(Parser)]
#[command(name = "ffbatch")]
#[command(author, version, about = "Batch media transforms driven by ffmpeg")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = ".config/settings.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process every media file in a folder
    Run {
        /// Folder containing the input files
        #[arg(required = true)]
        folder: PathBuf,

        /// Operation: compress, subtitle, trailer or splice
        #[arg(short, long)]
        mode: OperationMode,

        /// Encoder arguments (defaults to [encoding].default_args)
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,

        /// Regions to mask, `x,y,w,h` joined with `&`
        #[arg(long)]
        regions: Option<String>,

        /// Trailing window in seconds for the last region (trailer mode)
        #[arg(long)]
        window: Option<String>,

        /// Head length in seconds kept from the original (splice mode)
        #[arg(long)]
        head: Option<String>,

        /// Tail length in seconds kept from the original (splice mode)
        #[arg(long)]
        tail: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the duration of a media file
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,
    },
}
