//! catsplit CLI
//!
//! Command-line tools for building and reading partitioned catalogs.
//!
//! # Commands
//!
//! - `split` - Partition a catalog file into a directory store
//! - `unpack` - Decode a partition set back to files or stdout
//! - `inspect` - Display partition sizes and metadata
//! - `verify` - Check a partition set for completeness and size limits
//! - `plan` - Print the mount layout and extraction script

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// catsplit command-line tools.
#[derive(Parser)]
#[command(name = "catsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Partition a catalog file into a directory store
    Split {
        /// Catalog file to split ("-" for stdin)
        input: PathBuf,

        /// Directory store to write partitions into
        #[arg(short, long)]
        out: PathBuf,

        /// Base name of the partition set
        #[arg(short, long)]
        name: String,

        /// Namespace recorded on every partition
        #[arg(long, default_value = "default")]
        namespace: String,

        /// Kind of the owning object
        #[arg(long, requires = "owner_name")]
        owner_kind: Option<String>,

        /// Name of the owning object
        #[arg(long, requires = "owner_kind")]
        owner_name: Option<String>,

        /// API version of the owning object
        #[arg(long, default_value = "operators.coreos.com/v1alpha1")]
        owner_api_version: String,

        /// UID of the owning object (random if omitted)
        #[arg(long, requires = "owner_kind")]
        owner_uid: Option<uuid::Uuid>,

        /// Store payloads uncompressed
        #[arg(long)]
        plain: bool,

        /// Maximum storage object size in bytes
        #[arg(long, default_value_t = catsplit_core::DEFAULT_MAX_OBJECT_SIZE)]
        max_size: usize,

        /// Compression level (0-9)
        #[arg(long, default_value_t = 6)]
        level: u32,

        /// Build and report without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Decode a partition set back to files or stdout
    Unpack {
        /// Directory store holding the partitions
        dir: PathBuf,

        /// Base name of the partition set
        #[arg(short, long)]
        name: String,

        /// Directory to write decoded partitions into (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Display partition sizes and metadata
    Inspect {
        /// Directory store holding the partitions
        dir: PathBuf,

        /// Base name of the partition set
        #[arg(short, long)]
        name: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Check a partition set for completeness and size limits
    Verify {
        /// Directory store holding the partitions
        dir: PathBuf,

        /// Base name of the partition set
        #[arg(short, long)]
        name: String,

        /// Maximum storage object size in bytes
        #[arg(long, default_value_t = catsplit_core::DEFAULT_MAX_OBJECT_SIZE)]
        max_size: usize,
    },

    /// Print the mount layout and extraction script
    Plan {
        /// Directory store holding the partitions
        dir: PathBuf,

        /// Base name of the partition set
        #[arg(short, long)]
        name: String,

        /// Directory partitions are mounted under
        #[arg(long, default_value = catsplit_core::DEFAULT_MOUNT_ROOT)]
        mount_root: PathBuf,

        /// Directory partitions are expanded into
        #[arg(long, default_value = catsplit_core::DEFAULT_OUTPUT_ROOT)]
        output_root: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Split {
            input,
            out,
            name,
            namespace,
            owner_kind,
            owner_name,
            owner_api_version,
            owner_uid,
            plain,
            max_size,
            level,
            dry_run,
        } => {
            let owner = owner_kind.zip(owner_name).map(|(kind, name)| {
                let owner = catsplit_core::OwnerRef::new(owner_api_version, kind, name);
                match owner_uid {
                    Some(uid) => owner.with_uid(uid),
                    None => owner,
                }
            });
            let options = commands::split::SplitOptions {
                name,
                namespace,
                owner,
                plain,
                max_size,
                level,
                dry_run,
            };
            commands::split::run(&input, &out, &options)?;
        }
        Commands::Unpack { dir, name, out } => {
            commands::unpack::run(&dir, &name, out.as_deref())?;
        }
        Commands::Inspect { dir, name, format } => {
            commands::inspect::run(&dir, &name, &format)?;
        }
        Commands::Verify {
            dir,
            name,
            max_size,
        } => {
            commands::verify::run(&dir, &name, max_size)?;
        }
        Commands::Plan {
            dir,
            name,
            mount_root,
            output_root,
        } => {
            commands::plan::run(&dir, &name, &mount_root, &output_root)?;
        }
        Commands::Version => {
            println!("catsplit CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("catsplit Core v{}", catsplit_core::VERSION);
        }
    }

    Ok(())
}
