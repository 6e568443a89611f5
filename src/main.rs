//! pinreq - pinned requirements manifest tool
//!
//! Checks, formats, edits, resolves, installs and upgrades a
//! `requirements.txt` whose declarations are all `name==version` pins.

use clap::Parser;
use pinreq::cli::{CliArgs, Command};
use pinreq::config::{ConfigFile, Settings};
use pinreq::error::AppError;
use pinreq::installer::SystemInstaller;
use pinreq::logging::init_logger;
use pinreq::manifest::{locate_manifest, parse_declaration};
use pinreq::orchestrator::{EditOutcome, Orchestrator, UpgradeOptions};
use pinreq::output::{create_formatter, OutputConfig};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

/// Partial success: some lookups failed during upgrade
const EXIT_PARTIAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logger(args.verbose, args.quiet);

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Config file values merged with command-line overrides
fn load_settings(args: &CliArgs, manifest: &Path) -> Result<Settings, AppError> {
    let file = ConfigFile::discover(args.config.as_deref(), manifest)?;
    Ok(Settings::resolve(file, args.overrides())?)
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let path = locate_manifest(&args.file);
    let settings = load_settings(&args, &path)?;
    debug!(
        "pinreq v{} manifest={} index={}",
        env!("CARGO_PKG_VERSION"),
        path.display(),
        settings.index_url
    );

    let output_config =
        OutputConfig::from_cli(args.json, args.diff(), args.verbose, args.quiet, args.dry_run())
            .with_color(io::stdout().is_terminal());
    let formatter = create_formatter(output_config);
    let orchestrator = Orchestrator::new(&path, settings)?.with_progress(args.show_progress());
    let mut stdout = io::stdout();

    let exit_code = match args.command {
        Command::Check => {
            let report = orchestrator.check()?;
            formatter.format_check(&path, &report, &mut stdout)?;
            if report.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::List => {
            let manifest = orchestrator.load()?;
            formatter.format_list(&path, &manifest, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Command::Fmt { check } => {
            let outcome = orchestrator.format(check)?;
            formatter.format_edit(&path, &outcome, &mut stdout)?;
            match outcome {
                EditOutcome::Formatted {
                    changed: true,
                    written: false,
                } => ExitCode::FAILURE,
                _ => ExitCode::SUCCESS,
            }
        }
        Command::Resolve(_) => {
            let manifest = orchestrator.load()?;
            let resolution = orchestrator.resolve(&manifest).await;
            formatter.format_resolution(&resolution, &mut stdout)?;
            if resolution.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Install(_) => {
            let manifest = orchestrator.load()?;
            let outcome = orchestrator
                .install(&manifest, &SystemInstaller::new())
                .await;
            formatter.format_install(&outcome, &mut stdout)?;
            if outcome.success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Upgrade(ref upgrade) => {
            let options = UpgradeOptions {
                dry_run: upgrade.dry_run,
                filter: upgrade.filter(&orchestrator.settings().upgrade),
            };
            let result = orchestrator.upgrade(&options).await?;
            formatter.format(&result, &mut stdout)?;

            if args.verbose && !result.errors.is_empty() {
                eprintln!();
                eprintln!("Errors encountered:");
                for error in &result.errors {
                    eprintln!("  - {}", error);
                }
            }

            if result.errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_PARTIAL)
            }
        }
        Command::Add(ref add) => {
            let mut declaration = parse_declaration(&add.requirement)?;
            if let Some(ref category) = add.category {
                declaration = declaration.with_category(category.clone());
            }
            if let Some(ref comment) = add.comment {
                declaration = declaration.with_comment(comment.clone());
            }
            let outcome = orchestrator.add(declaration, add.force)?;
            formatter.format_edit(&path, &outcome, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Command::Remove { ref name } => {
            let outcome = orchestrator.remove(name)?;
            formatter.format_edit(&path, &outcome, &mut stdout)?;
            ExitCode::SUCCESS
        }
    };

    stdout.flush()?;
    Ok(exit_code)
}
