use clap::{Parser, Subcommand};
use std::path::PathBuf;
use usmkit::config::{DEFAULT_CONFIG_FILE, DEFAULT_MANIFEST_FILE};

#[derive(Parser)]
#[command(name = "usmkit")]
#[command(author, version, about = "Convert CRI USM videos into standard media files")]
pub struct Cli {
    /// Path to the join configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding ffmpeg and the vgmstream folder
    #[arg(long, global = true, default_value = ".")]
    pub tools_dir: PathBuf,

    /// Skip the join when ADX audio cannot be converted (false: join it unconverted)
    #[arg(long, global = true, default_value_t = true, action = clap::ArgAction::Set)]
    pub strict_dependencies: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the audio and video streams from a USM file or a directory of them
    Extract {
        /// USM file or directory
        #[arg(required = true)]
        path: PathBuf,

        /// Join the extracted streams into a single output file
        #[arg(short, long)]
        join: bool,

        /// Directory for joined files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Remove temporary stream files after joining
        #[arg(short, long)]
        clean: bool,
    },

    /// Convert a USM file or a directory of them into the configured format
    Convert {
        /// USM file or directory
        #[arg(required = true)]
        path: PathBuf,

        /// Directory for converted files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Remove temporary stream files after converting
        #[arg(short, long)]
        clean: bool,
    },

    /// Download ffmpeg and vgmstream into the tools directory
    GetDependencies {
        /// Dependency manifest listing the download URLs
        #[arg(long, default_value = DEFAULT_MANIFEST_FILE)]
        manifest: PathBuf,
    },

    /// Check that required external tools are available
    CheckTools,
}
