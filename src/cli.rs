//! CLI argument parsing module for pinreq

use crate::config::{parse_duration, Installer, Overrides};
use crate::domain::Category;
use crate::update::UpdateFilter;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

/// Pinned requirements manifest tool
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pinreq",
    version,
    about = "Check, resolve and upgrade a pinned requirements.txt"
)]
pub struct CliArgs {
    /// Manifest file, or a directory containing requirements.txt
    #[arg(short, long, global = true, default_value = "requirements.txt")]
    pub file: PathBuf,

    /// Config file (default: pinreq.toml next to the manifest)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Package index base URL
    #[arg(long, global = true, env = "PINREQ_INDEX_URL")]
    pub index_url: Option<String>,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate the manifest and report every problem
    Check,
    /// List declarations grouped by category
    List,
    /// Rewrite the manifest in canonical layout
    Fmt {
        /// Only report whether the file is formatted (exit 1 if not)
        #[arg(long)]
        check: bool,
    },
    /// Verify every pin exists in the index and pins do not conflict
    Resolve(ResolveArgs),
    /// Resolve, then install the manifest with pip or uv
    Install(InstallArgs),
    /// Bump pins to the newest eligible releases
    Upgrade(UpgradeArgs),
    /// Add a `name==version` declaration
    Add(AddArgs),
    /// Remove a declaration
    Remove {
        /// Package name
        name: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Target Python version checked against `Requires-Python` (e.g. 3.11)
    #[arg(long)]
    pub python: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Target Python version checked against `Requires-Python` (e.g. 3.11)
    #[arg(long)]
    pub python: Option<String>,

    /// Installer to run after a successful resolution
    #[arg(long, value_enum)]
    pub installer: Option<Installer>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpgradeArgs {
    /// Dry run mode - show what would be updated without making changes
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show changes in diff format
    #[arg(long)]
    pub diff: bool,

    /// Update only specific packages (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub only: Vec<String>,

    /// Exclude specific packages from update (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Only update to versions released at least this long ago (e.g., 2w, 10d, 1m)
    #[arg(long, value_parser = parse_duration)]
    pub age: Option<Duration>,

    /// Consider pre-releases
    #[arg(long)]
    pub pre: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Requirement such as `pyxlsb==1.0.10`
    pub requirement: String,

    /// Section to add to (core, visualization, excel-support, file-handling, styling or any name)
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Trailing comment
    #[arg(long)]
    pub comment: Option<String>,

    /// Replace the pin if the package is already declared
    #[arg(long)]
    pub force: bool,
}

impl CliArgs {
    /// Config values given on the command line
    pub fn overrides(&self) -> Overrides {
        let (python_version, installer) = match self.command {
            Command::Resolve(ref args) => (args.python.clone(), None),
            Command::Install(ref args) => (args.python.clone(), args.installer),
            _ => (None, None),
        };
        Overrides {
            index_url: self.index_url.clone(),
            python_version,
            installer,
        }
    }

    /// Spinners and progress bars are shown only for interactive text output
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }

    pub fn dry_run(&self) -> bool {
        matches!(self.command, Command::Upgrade(ref args) if args.dry_run)
    }

    pub fn diff(&self) -> bool {
        matches!(self.command, Command::Upgrade(ref args) if args.diff)
    }
}

impl UpgradeArgs {
    /// Merge the flags into the `[upgrade]` config
    ///
    /// Non-empty `--only`/`--exclude` lists and `--age` replace the config
    /// values; `--pre` can only turn pre-releases on.
    pub fn filter(&self, base: &UpdateFilter) -> UpdateFilter {
        let mut filter = base.clone();
        if !self.only.is_empty() {
            filter = filter.with_only(self.only.clone());
        }
        if !self.exclude.is_empty() {
            filter = filter.with_exclude(self.exclude.clone());
        }
        if let Some(age) = self.age {
            filter = filter.with_min_age(age);
        }
        if self.pre {
            filter = filter.with_prerelease(true);
        }
        filter
    }
}
