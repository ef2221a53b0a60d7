//! Langpack - command-line front end for the translation model package manager.
//!
//! Resolves the managed directory, installs the log subscriber and drives
//! `langpack-core` for one command.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use langpack_core::config::{AppConfig, NetworkConfig};
use langpack_core::{PackageIdentity, PackageManager, PackageRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "langpack")]
#[command(about = "Manage local machine-translation model packages")]
struct Args {
    /// Directory installed packages live in
    #[arg(long, env = AppConfig::MANAGED_DIR_ENV)]
    managed_dir: Option<PathBuf>,

    /// Extra directory scanned for packages (defaults to the current directory)
    #[arg(long)]
    search_dir: Option<PathBuf>,

    /// Remote catalog endpoint
    #[arg(long, default_value = NetworkConfig::CATALOG_URL)]
    catalog_url: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List installed packages
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Install a package archive
    Install {
        /// Path to a .tar.gz package archive
        archive: PathBuf,

        /// File name to derive the install directory from
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove an installed package
    Remove {
        short_name: String,
        src: String,
        trg: String,
    },
    /// List archives waiting in the managed directory
    Pending,
    /// Fetch the catalog and show new and outdated packages
    Check,
}

fn default_managed_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine the user data directory")?;
    Ok(data_dir.join(AppConfig::APP_NAME))
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()?.join(path))
}

fn format_version(version: Option<f64>) -> String {
    version.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn print_packages(packages: &[PackageRecord]) {
    for package in packages {
        println!(
            "{:<12} {:>3} -> {:<3} {:<8} local {:<6} remote {:<6} {}",
            package.short_name,
            package.source_language,
            package.target_language,
            package.package_type,
            format_version(package.local_version),
            format_version(package.remote_version),
            package
                .install_path()
                .map(|p| p.display().to_string())
                .or_else(|| package.download_url().map(str::to_string))
                .unwrap_or_default()
        );
    }
}

fn print_archives(archives: &[PathBuf]) {
    for archive in archives {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive.display().to_string());
        println!("{}", name);
    }
}

fn install(manager: &mut PackageManager, archive: &Path, name: Option<&str>) -> Result<()> {
    let record = manager
        .install_file(archive, name)
        .with_context(|| format!("Failed to install {}", archive.display()))?;
    println!(
        "Installed {} into {}",
        record.identity(),
        record
            .install_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let managed_dir = match args.managed_dir {
        Some(path) => absolute(path)?,
        None => default_managed_dir()?,
    };
    let search_dir = match args.search_dir {
        Some(path) => absolute(path)?,
        None => std::env::current_dir()?,
    };
    debug!("Managed directory: {}", managed_dir.display());

    let mut manager = PackageManager::builder(&managed_dir)
        .auto_create_dir(true)
        .search_dir(search_dir)
        .catalog_url(args.catalog_url)
        .build()
        .context("Failed to initialize package manager")?;
    manager.startup_scan()?;

    match args.command {
        Command::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(manager.installed())?);
            } else if manager.installed().is_empty() {
                println!("No packages installed in {}", managed_dir.display());
            } else {
                print_packages(manager.installed());
            }
        }
        Command::Install { archive, name } => {
            install(&mut manager, &absolute(archive)?, name.as_deref())?;
        }
        Command::Remove {
            short_name,
            src,
            trg,
        } => {
            let identity = PackageIdentity::new(short_name, src, trg);
            if manager.find_installed(&identity).is_none() {
                bail!("{} is not installed", identity);
            }
            let state = manager.remove(&identity)?;
            println!("Removed {} ({:?})", identity, state);
        }
        Command::Pending => {
            if manager.pending_archives().is_empty() {
                println!("No pending archives in {}", managed_dir.display());
            } else {
                print_archives(manager.pending_archives());
            }
        }
        Command::Check => {
            manager.refresh();
            manager
                .wait_for_catalog()
                .await
                .context("Failed to fetch the catalog")?;

            println!("New packages ({}):", manager.new_packages().len());
            print_packages(manager.new_packages());
            println!();
            println!("Outdated packages ({}):", manager.outdated_packages().len());
            print_packages(manager.outdated_packages());
        }
    }

    Ok(())
}
