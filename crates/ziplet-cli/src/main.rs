//! ziplet-cli - Command-line interface for the ziplet archiver
//!
//! Packs files and directories into ZIP/CBZ archives, unpacks them with
//! traversal protection, and manages the accepted archive extensions.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ziplet_core::archive::reader::{default_destination, list_entries};
use ziplet_core::archive::Compression;
use ziplet_core::config::Config;
use ziplet_core::{Archiver, ExtensionPolicy, Progress, ProgressUnit};

mod password;
mod progress;

use password::resolve_password;
use progress::ProgressBarCallback;

/// ziplet - Pack paths into ZIP and CBZ archives and unpack them again
#[derive(Parser)]
#[command(name = "ziplet")]
#[command(author, version, about = "Pack paths into ZIP and CBZ archives", long_about = None)]
struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show progress bar during operations
    #[arg(long, global = true)]
    progress: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "ZIPLET_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack files and directories into an archive
    Zip {
        /// Input files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output archive file
        #[arg(short, long)]
        output: PathBuf,

        /// Encrypt file entries with this password
        #[arg(long, conflicts_with = "ask_password")]
        password: Option<String>,

        /// Prompt for the password
        #[arg(long)]
        ask_password: bool,

        /// Store entries without compression
        #[arg(long, conflicts_with = "level")]
        store: bool,

        /// Compression level (0-9)
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..=9))]
        level: Option<i64>,

        /// Weight progress by file size instead of entry count
        #[arg(long)]
        bytes: bool,

        /// Accept an additional archive extension for this run
        #[arg(long = "allow-extension", value_name = "EXT")]
        allow_extension: Vec<String>,
    },

    /// Extract an archive into a directory
    Unzip {
        /// Archive file to extract
        archive: PathBuf,

        /// Output directory (defaults to the archive name next to it)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(long)]
        overwrite: bool,

        /// Password for encrypted entries
        #[arg(long, conflicts_with = "ask_password")]
        password: Option<String>,

        /// Prompt for the password
        #[arg(long)]
        ask_password: bool,

        /// Weight progress by entry size instead of entry count
        #[arg(long)]
        bytes: bool,
    },

    /// List the entry names of an archive
    List {
        /// Archive file to inspect
        archive: PathBuf,

        /// Output format as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect accepted archive extensions
    Ext {
        #[command(subcommand)]
        action: ExtCommands,
    },

    /// Show or initialize configuration
    Config {
        /// Show current configuration
        #[arg(long, conflicts_with_all = ["path", "init"])]
        show: bool,

        /// Show configuration file path
        #[arg(long, conflicts_with_all = ["show", "init"])]
        path: bool,

        /// Write a commented default configuration file
        #[arg(long, conflicts_with_all = ["show", "path"])]
        init: bool,
    },
}

#[derive(Subcommand)]
enum ExtCommands {
    /// Check whether an extension is accepted for new archives
    Check {
        /// Extension with or without the leading dot
        extension: String,
    },

    /// List all accepted extensions
    List,
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let result = run();

    match result {
        Ok(_) => process::exit(0),
        Err(e) => {
            // Printed directly so --quiet still reports the failure
            eprintln!("Error: {:#}", e);

            let exit_code = map_error_to_exit_code(&e);
            process::exit(exit_code);
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let show_progress = cli.progress && !cli.quiet;
    let config = load_config(cli.config.as_deref())?;

    // Configured extensions apply to this process only
    let policy = ExtensionPolicy::new();
    config.register_extensions(&policy);

    match cli.command {
        Commands::Zip {
            paths,
            output,
            password,
            ask_password,
            store,
            level,
            bytes,
            allow_extension,
        } => {
            for extension in &allow_extension {
                policy.add_custom(extension);
            }

            let mut options = config.zip_options();
            if store {
                options.compression = Compression::Stored;
            }
            if level.is_some() {
                options.level = level;
            }
            if bytes {
                options.unit = ProgressUnit::Bytes;
            }

            let password = resolve_password(password, ask_password, true)?;

            info!("Packing {} path(s) into {:?}", paths.len(), output);
            with_progress(show_progress, options.unit, |progress| {
                Archiver::new(&policy).zip_files_with_options(
                    &paths,
                    &output,
                    password.as_deref(),
                    Some(progress),
                    &options,
                )
            })?;
            info!("Packing complete");
        }

        Commands::Unzip {
            archive,
            output,
            overwrite,
            password,
            ask_password,
            bytes,
        } => {
            let destination = output.unwrap_or_else(|| default_destination(&archive));
            let overwrite = overwrite || config.extraction.overwrite;

            let mut options = config.unzip_options();
            if bytes {
                options.unit = ProgressUnit::Bytes;
            }

            let password = resolve_password(password, ask_password, false)?;

            info!("Extracting {:?} into {:?}", archive, destination);
            with_progress(show_progress, options.unit, |progress| {
                Archiver::new(&policy).unzip_file_with_options(
                    &archive,
                    &destination,
                    overwrite,
                    password.as_deref(),
                    Some(progress),
                    &options,
                )
            })?;
            info!("Extraction complete");
        }

        Commands::List { archive, json } => {
            let names = list_entries(&archive)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }

        Commands::Ext { action } => match action {
            ExtCommands::Check { extension } => {
                if policy.is_valid(&extension) {
                    println!("{}: valid", extension);
                } else {
                    println!("{}: invalid", extension);
                    return Err(ziplet_core::Error::InvalidExtension {
                        path: PathBuf::from(format!("archive.{}", extension.trim_start_matches('.'))),
                        extension: Some(extension),
                    }
                    .into());
                }
            }
            ExtCommands::List => {
                for extension in policy.extensions() {
                    println!("{}", extension);
                }
            }
        },

        Commands::Config { show, path, init } => {
            let config_path = match cli.config {
                Some(path) => path,
                None => Config::config_path()?,
            };

            if show {
                println!("{}", toml::to_string_pretty(&config)?);
            } else if path {
                println!("{}", config_path.display());
            } else if init {
                if config_path.exists() {
                    info!("Configuration already exists at {:?}", config_path);
                } else {
                    if let Some(parent) = config_path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&config_path, Config::default_config_content())?;
                    info!("Wrote default configuration to {:?}", config_path);
                }
                println!("{}", config_path.display());
            } else {
                eprintln!("Please specify --show, --path, or --init");
            }
        }
    }

    Ok(())
}

/// Load the explicit config file if given, else the default location
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) if path.exists() => Ok(Config::load_from(path)?),
        Some(path) => {
            warn!("Configuration file {:?} does not exist, using defaults", path);
            Ok(Config::default())
        }
        None => Ok(Config::load()?),
    }
}

/// Run `operation` with a progress tracker, rendering a bar when enabled
fn with_progress<F>(enabled: bool, unit: ProgressUnit, operation: F) -> ziplet_core::Result<()>
where
    F: FnOnce(&Progress) -> ziplet_core::Result<()>,
{
    if !enabled {
        return operation(&Progress::new());
    }

    let bar = Arc::new(ProgressBarCallback::new(unit));
    let progress = Progress::new().with_callback(bar.clone());
    let result = operation(&progress);

    match &result {
        Ok(()) => bar.finish("done"),
        Err(_) => bar.abandon(),
    }
    result
}

fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(ziplet_err) = err.downcast_ref::<ziplet_core::Error>() {
        match ziplet_err {
            ziplet_core::Error::NotFound(_) => 2,
            ziplet_core::Error::Io(_) => 2,
            ziplet_core::Error::InvalidExtension { .. } => 3,
            ziplet_core::Error::PathTraversal(_) => 3,
            ziplet_core::Error::Entry { .. } => 4,
            ziplet_core::Error::Zip(_) => 4,
            ziplet_core::Error::BadPassword(_) => 5,
            ziplet_core::Error::Config(_) => 1,
        }
    } else if err.is::<std::io::Error>() {
        2
    } else {
        1
    }
}
