use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "super-sorter")]
#[command(about = "Sort files into per-extension folders, deleting true duplicates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Organize a directory tree by file extension
    Organize(OrganizeArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Directory to organize
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Stop at the first file that cannot be organized
    #[arg(long)]
    pub fail_fast: bool,

    /// Register files already in category folders before walking
    #[arg(long)]
    pub seed_existing: bool,

    /// Only ever try the `_1` suffix; fail instead of trying `_2`, `_3`, ...
    #[arg(long)]
    pub fixed_suffix: bool,

    /// Reserve the names of archived files in their category
    #[arg(long)]
    pub register_archived: bool,

    /// Log every placement
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organize_defaults_to_current_dir() {
        let cli = Cli::parse_from(["super-sorter", "organize"]);
        match cli.command {
            Some(Commands::Organize(args)) => {
                assert_eq!(args.path, PathBuf::from("."));
                assert!(!args.fail_fast);
                assert!(!args.seed_existing);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_organize_flags() {
        let cli = Cli::parse_from([
            "super-sorter",
            "organize",
            "/tmp/photos",
            "--fail-fast",
            "--fixed-suffix",
            "--register-archived",
            "-v",
        ]);
        let Some(Commands::Organize(args)) = cli.command else {
            panic!("expected organize");
        };
        assert_eq!(args.path, PathBuf::from("/tmp/photos"));
        assert!(args.fail_fast);
        assert!(args.fixed_suffix);
        assert!(args.register_archived);
        assert!(args.verbose);
    }
}
