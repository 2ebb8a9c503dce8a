use clap::{Parser, Subcommand};
use std::path::PathBuf;

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "promo", version, about = "Referral lifecycle manager")]
pub struct Cli {
    /// TOML config file; built-in defaults when omitted.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides `referral.user_data_dir`.
    #[arg(long, global = true)]
    pub user_data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

///
/// Command
///

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the manager and keep it running until Ctrl-C.
    Run,

    /// Print the persisted referral state as JSON.
    Status,

    /// Run the activity gate and, when due, one activity check.
    Check,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "promo",
            "status",
            "--user-data-dir",
            "/tmp/x",
            "--config",
            "promo.toml",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Status));
        assert_eq!(cli.user_data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.config, Some(PathBuf::from("promo.toml")));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["promo"]).is_err());
    }
}
