use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Build and inspect lazy-fs images")]
pub struct Cli {
    /// Image file
    #[arg(long, short)]
    pub image: PathBuf,

    /// Native I/O unit of the emulated device, in bytes
    #[arg(long, default_value_t = 512)]
    pub io_size: usize,

    /// Materialize only the root directory at mount
    #[arg(long)]
    pub lazy: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a zero-filled image and format it
    Format {
        /// Image size in MiB
        #[arg(long, short, default_value_t = 4)]
        size: u64,
    },
    /// Create a directory
    Mkdir { path: String },
    /// Create an empty regular file
    Touch { path: String },
    /// Create a symbolic link at PATH pointing to TARGET
    Symlink { target: String, path: String },
    /// List a directory
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Show attributes
    Stat { path: String },
    /// Print the whole hierarchy
    Tree,
    /// Mirror the hierarchy of a host directory into the image
    Pack {
        /// Host directory
        source: PathBuf,

        /// Destination directory inside the image
        #[arg(long, short, default_value = "/")]
        dest: String,
    },
}
