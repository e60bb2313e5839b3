mod commands;
mod logging;
mod progress;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, OrganizeArgs};
use dotenv::dotenv;
use progress::CliReporter;
use super_sorter_core::config::load_configuration;
use super_sorter_core::{AppConfig, ArchivePolicy, ErrorPolicy, Organizer, RenamePolicy};
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Cli::parse();
    let verbose = matches!(&args.command, Some(Commands::Organize(org)) if org.verbose);
    let _guard = logging::init_logger(verbose);

    let config = load_configuration().context("Error loading configuration")?;

    match args.command {
        Some(Commands::Organize(org)) => run_organize(config, &org)?,
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn apply_overrides(mut config: AppConfig, args: &OrganizeArgs) -> AppConfig {
    if args.fail_fast {
        config.error_policy = ErrorPolicy::FailFast;
    }
    if args.seed_existing {
        config.seed_existing = true;
    }
    if args.fixed_suffix {
        config.rename_policy = RenamePolicy::Fixed;
    }
    if args.register_archived {
        config.archive_policy = ArchivePolicy::Registered;
    }
    config
}

fn run_organize(config: AppConfig, args: &OrganizeArgs) -> anyhow::Result<()> {
    let engine = Organizer::new(apply_overrides(config, args));
    let reporter = CliReporter::new();
    let report = engine
        .organize(&args.path, &reporter)
        .with_context(|| format!("Error organizing {}", args.path.display()))?;

    println!();
    info!(
        "Scan: {}, Organize: {}",
        format!("{:.2}s", report.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.organize_duration.as_secs_f64()).green(),
    );
    info!(
        "{} placed, {} renamed, {} archived",
        format!("{}", report.placed).green(),
        format!("{}", report.renamed).cyan(),
        format!("{}", report.archived).yellow(),
    );
    info!(
        "{} duplicates deleted, {} bytes reclaimed",
        format!("{}", report.deleted).red(),
        format!("{}", report.bytes_reclaimed).red(),
    );

    if report.failed > 0 {
        bail!("{} files could not be organized", report.failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_config() {
        let args = OrganizeArgs {
            path: PathBuf::from("."),
            fail_fast: true,
            seed_existing: true,
            fixed_suffix: true,
            register_archived: true,
            verbose: false,
        };
        let config = apply_overrides(AppConfig::default(), &args);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert_eq!(config.rename_policy, RenamePolicy::Fixed);
        assert_eq!(config.archive_policy, ArchivePolicy::Registered);
        assert!(config.seed_existing);
    }

    #[test]
    fn test_unset_flags_keep_loaded_values() {
        let args = OrganizeArgs {
            path: PathBuf::from("."),
            fail_fast: false,
            seed_existing: false,
            fixed_suffix: false,
            register_archived: false,
            verbose: false,
        };
        let loaded = AppConfig {
            rename_policy: RenamePolicy::Fixed,
            seed_existing: true,
            ..AppConfig::default()
        };
        let config = apply_overrides(loaded, &args);
        assert_eq!(config.rename_policy, RenamePolicy::Fixed);
        assert!(config.seed_existing);
        assert_eq!(config.error_policy, ErrorPolicy::Continue);
    }
}
