//! treecp - recursive async tree copy
//!
//! Copies a file, a symlink or a whole directory tree, with configurable
//! overwrite, symlink and error policies.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;
use tracing::info;
use treecp_config::{Config, ConfigBuilder, ConfigLoader, LoggingConfig};
use treecp_engine::{copy, CopyOptions};
use treecp_types::{ConcurrencyLimit, CopyStats};

/// treecp - recursive async tree copy
#[derive(Parser, Debug)]
#[command(
    name = "treecp",
    version = env!("CARGO_PKG_VERSION"),
    about = "Recursively copy a directory tree",
    long_about = "treecp copies files, directories and symbolic links from SOURCE to DESTINATION.\n\
                  Defaults (overwrite existing files, dereference links, collect all errors)\n\
                  can be changed here or in treecp.yaml / TREECP__COPY__* variables."
)]
struct Cli {
    /// Source path
    source: PathBuf,

    /// Destination path
    destination: PathBuf,

    /// Maximum number of files copied at once (1-512)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Leave existing destination files alone
    #[arg(short = 'n', long)]
    no_clobber: bool,

    /// With --no-clobber, still overwrite files whose source is newer
    #[arg(short, long)]
    update: bool,

    /// Abort on the first error instead of reporting all of them at the end
    #[arg(long)]
    stop_on_error: bool,

    /// Recreate symbolic links instead of copying what they point to
    #[arg(short = 'P', long)]
    no_dereference: bool,

    /// Copy access and modification times
    #[arg(short, long)]
    preserve_timestamps: bool,

    /// Glob pattern of entries to skip (repeatable)
    #[arg(short, long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Verbose mode - detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - minimal output
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Fold command-line switches over the loaded configuration
    fn apply(&self, config: &mut Config) -> Result<()> {
        let settings = &mut config.copy;
        if let Some(limit) = self.limit {
            settings.limit = Some(ConcurrencyLimit::new(limit).map_err(anyhow::Error::msg)?);
        }
        if self.no_clobber {
            settings.clobber = false;
        }
        if self.update {
            settings.update_newer = true;
        }
        if self.stop_on_error {
            settings.stop_on_error = true;
        }
        if self.no_dereference {
            settings.inflate_symlinks = false;
        }
        if self.preserve_timestamps {
            settings.preserve_timestamps = true;
        }
        settings.exclude.extend(self.exclude.iter().cloned());
        ConfigBuilder::validate(config)?;
        Ok(())
    }

    fn log_level<'a>(&self, logging: &'a LoggingConfig) -> &'a str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else if self.quiet {
            "error"
        } else {
            logging.level.as_str()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load_default()?,
    };
    cli.apply(&mut config)?;

    init_logging(cli.log_level(&config.logging), config.logging.json)?;
    info!("treecp v{} starting", env!("CARGO_PKG_VERSION"));

    let options = CopyOptions::from_config(&config)?;

    if !cli.quiet {
        println!(
            "{} Copying {} to {}",
            style("→").green().bold(),
            style(cli.source.display()).cyan(),
            style(cli.destination.display()).cyan()
        );
    }

    let stats = copy(&cli.source, &cli.destination, options)
        .await
        .with_context(|| {
            format!(
                "Failed to copy {} to {}",
                cli.source.display(),
                cli.destination.display()
            )
        })?;

    if !cli.quiet {
        print_summary(&stats);
    }
    Ok(())
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

fn print_summary(stats: &CopyStats) {
    println!("{} {}", style("✓").green().bold(), summary_line(stats));
    if stats.files_skipped > 0 || stats.entries_filtered > 0 {
        println!(
            "  {} skipped, {} filtered",
            style(stats.files_skipped).yellow(),
            style(stats.entries_filtered).yellow()
        );
    }
}

fn summary_line(stats: &CopyStats) -> String {
    format!(
        "{} entries written ({} files, {} directories, {} symlinks), {} bytes in {:.2?} ({:.1} MB/s)",
        stats.entries_written(),
        stats.files_copied,
        stats.directories_created,
        stats.symlinks_created,
        stats.bytes_copied,
        stats.duration,
        stats.transfer_rate() / (1024.0 * 1024.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_leave_config_untouched() {
        let cli = Cli::try_parse_from(["treecp", "src", "dst"]).unwrap();
        let mut config = Config::default();
        cli.apply(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_switches_override_config() {
        let cli = Cli::try_parse_from([
            "treecp",
            "--limit",
            "8",
            "--no-clobber",
            "--update",
            "--stop-on-error",
            "--no-dereference",
            "--preserve-timestamps",
            "--exclude",
            "*.tmp",
            "src",
            "dst",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply(&mut config).unwrap();

        assert_eq!(config.copy.limit.map(ConcurrencyLimit::get), Some(8));
        assert!(!config.copy.clobber);
        assert!(config.copy.update_newer);
        assert!(config.copy.stop_on_error);
        assert!(!config.copy.inflate_symlinks);
        assert!(config.copy.preserve_timestamps);
        assert_eq!(config.copy.exclude, vec!["*.tmp".to_string()]);
    }

    #[rstest]
    #[case(&["treecp", "--limit", "0", "src", "dst"])]
    #[case(&["treecp", "--exclude", "a[", "src", "dst"])]
    fn test_invalid_switches_are_rejected(#[case] args: &[&str]) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.apply(&mut Config::default()).is_err());
    }

    #[test]
    fn test_summary_line() {
        let stats = CopyStats {
            files_copied: 3,
            directories_created: 2,
            symlinks_created: 1,
            bytes_copied: 2 * 1024 * 1024,
            duration: std::time::Duration::from_secs(2),
            ..CopyStats::default()
        };

        assert_eq!(
            summary_line(&stats),
            "6 entries written (3 files, 2 directories, 1 symlinks), 2097152 bytes in 2.00s (1.0 MB/s)"
        );
    }

    #[rstest]
    #[case(&["treecp", "-d", "src", "dst"], "debug")]
    #[case(&["treecp", "-v", "src", "dst"], "info")]
    #[case(&["treecp", "-q", "src", "dst"], "error")]
    #[case(&["treecp", "src", "dst"], "info")]
    fn test_log_level(#[case] args: &[&str], #[case] expected: &str) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.log_level(&LoggingConfig::default()), expected);
    }
}
