use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Browse a project's directories and mark package boundaries
#[derive(Parser, Debug)]
#[command(name = "pkgmark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project root to browse
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory levels expanded on startup, below the first
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// File name that declares a directory as a package
    #[arg(long)]
    pub marker: Option<String>,

    /// Compare this ref against the base instead of the working tree
    #[arg(long)]
    pub head: Option<String>,

    /// Base ref for change detection
    #[arg(long)]
    pub base: Option<String>,

    /// Skip change detection
    #[arg(long)]
    pub no_changes: bool,

    /// Print the selection as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the debug log here instead of the cache directory
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Effective settings after layering the command line over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub root: PathBuf,
    pub depth: usize,
    pub package_marker: String,
    pub show_changed: bool,
    pub head: Option<String>,
    pub base_ref: String,
}

impl Cli {
    pub fn settings(&self, config: &AppConfig) -> Settings {
        Settings {
            root: self.path.clone(),
            depth: self.depth.unwrap_or(config.depth),
            package_marker: self
                .marker
                .clone()
                .unwrap_or_else(|| config.package_marker.clone()),
            show_changed: config.show_changed && !self.no_changes,
            head: self.head.clone(),
            base_ref: self.base.clone().unwrap_or_else(|| config.base_ref.clone()),
        }
    }
}
