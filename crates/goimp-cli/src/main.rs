//! goimp CLI - pin and restore the imports of a Go workspace project

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use goimp_pkg::Workspace;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod bind;
mod get;
mod init;
mod list;
mod write;

#[derive(Parser)]
#[command(name = "goimp")]
#[command(version = goimp_core::VERSION)]
#[command(about = "Pin the imports of a Go project to VCS revisions", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error) or filter directives;
    /// defaults to RUST_LOG, then info
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the imports of a package
    List {
        /// Directory of the package
        #[arg(short = 'p', default_value = ".")]
        dir: PathBuf,

        /// Find imports recursively
        #[arg(short = 'r')]
        recursive: bool,

        /// Print the revision of each import
        #[arg(long)]
        hash: bool,
    },

    /// Write the pinned imports of a package to its manifest
    Write {
        /// Directory of the package
        #[arg(short = 'p', default_value = ".")]
        dir: PathBuf,

        /// Manifest file name
        #[arg(long)]
        file: Option<String>,

        /// Find imports recursively
        #[arg(
            short = 'r',
            default_value_t = true,
            num_args = 0..=1,
            default_missing_value = "true",
            action = ArgAction::Set
        )]
        recursive: bool,

        /// Pin each import to its revision
        #[arg(
            long,
            default_value_t = true,
            num_args = 0..=1,
            default_missing_value = "true",
            action = ArgAction::Set
        )]
        hash: bool,
    },

    /// Restore the workspace from the manifest, or fetch a single import
    Get {
        /// Directory of the package
        #[arg(short = 'p', default_value = ".")]
        dir: PathBuf,

        /// Manifest file name
        #[arg(long)]
        file: Option<String>,

        /// Ignore pinned revisions and move to the latest code
        #[arg(long)]
        reset: bool,

        /// Import path to fetch instead of the manifest entries
        import: Option<String>,

        /// Revision for the import
        #[arg(requires = "import")]
        rev: Option<String>,
    },

    /// Keep the manifest and the workspace in step
    Bind {
        /// Directory of the package
        #[arg(short = 'p', default_value = ".")]
        dir: PathBuf,

        /// Manifest file name
        #[arg(long)]
        file: Option<String>,
    },

    /// Create a vendor workspace and a GOPATH env file for a repository
    Init {
        /// Directory containing the source files
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Directory for vendored repositories (defaults to <repo>/.vendor)
        #[arg(long)]
        vendor: Option<PathBuf>,
    },
}

/// A bare word must be a level name. Anything else would be taken as a
/// target directive and silence every log line.
fn parse_log_level(value: &str) -> Result<String, String> {
    if value.contains('=') || value.contains(',') {
        EnvFilter::try_new(value).map_err(|err| err.to_string())?;
    } else {
        value.parse::<LevelFilter>().map_err(|_| {
            format!("`{value}` is not one of off, error, warn, info, debug, trace")
        })?;
    }
    Ok(value.to_string())
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|err| {
            if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
                eprintln!("warning: ignoring {}: {err}", EnvFilter::DEFAULT_ENV);
            }
            EnvFilter::new("info")
        }),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn workspace() -> Result<Workspace> {
    Workspace::from_env().context("cannot locate the Go workspace")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match cli.command {
        Commands::List {
            dir,
            recursive,
            hash,
        } => {
            let options = list::ListOptions {
                dir,
                recursive,
                hash,
            };
            list::list_imports(&workspace()?, &options)?;
        }

        Commands::Write {
            dir,
            file,
            recursive,
            hash,
        } => {
            let options = write::WriteOptions {
                dir,
                file,
                recursive,
                hash,
            };
            write::write_manifest(&workspace()?, options)?;
        }

        Commands::Get {
            dir,
            file,
            reset,
            import,
            rev,
        } => {
            let options = get::GetOptions {
                dir,
                file,
                reset,
                import,
                rev,
            };
            get::get_imports(&workspace()?, options)?;
        }

        Commands::Bind { dir, file } => {
            bind::bind(&workspace()?, bind::BindOptions { dir, file })?;
        }

        Commands::Init { repo, vendor } => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            let env_file = init::init_workspace(&init::InitOptions { repo, vendor }, &cwd)?;
            println!("Created {}", env_file.display());
            println!("Run `source {}` to use the vendor workspace", env_file.display());
        }
    }

    Ok(())
}
