use crate::{cli::Cli, error::CliError};
use promo_core::{
    ErrorOrigin, ReferralManager, Services,
    config::{Config, ConfigModel},
    error::ErrorContext,
    log,
    log::{LogBuffer, Topic},
    storage::{JsonFilePrefStore, ReferralPhase, ReferralState, ReferralStore},
};
use serde::Serialize;
use std::sync::Arc;

///
/// StatusReport
///

#[derive(Debug, Serialize)]
struct StatusReport {
    phase: ReferralPhase,
    #[serde(flatten)]
    state: ReferralState,
}

/// Load, apply command-line overrides and configure logging.
pub fn load_config(cli: &Cli) -> Result<Arc<ConfigModel>, CliError> {
    let mut config = Config::load(cli.config.as_deref())?;

    if let Some(dir) = &cli.user_data_dir {
        Arc::make_mut(&mut config).referral.user_data_dir.clone_from(dir);
    }
    LogBuffer::configure(&config.log);

    Ok(config)
}

// -------------------------------------------------------------
// Commands
// -------------------------------------------------------------

pub fn status(config: &ConfigModel) -> Result<(), CliError> {
    let prefs = JsonFilePrefStore::open(config.referral.prefs_path()).at(ErrorOrigin::Store)?;
    let state = ReferralStore::new(&prefs).load();

    let report = StatusReport {
        phase: state.phase(),
        state,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

pub async fn run(config: Arc<ConfigModel>) -> Result<(), CliError> {
    let services = Services::production(&config)?;
    let manager = ReferralManager::new(Arc::clone(&config), services);

    manager.start()?;
    log!(
        Topic::Manager,
        Info,
        "running against {} (data dir {})",
        config.referral.server,
        config.referral.user_data_dir.display()
    );

    let signal = tokio::signal::ctrl_c()
        .await
        .map_err(|e| CliError::Signal(e.to_string()));

    manager.stop();
    manager.settle().await;

    for entry in manager.http_metrics() {
        log!(
            Topic::Http,
            Info,
            "{} {}: {} request(s), {} failure(s)",
            entry.method,
            entry.label,
            entry.requests,
            entry.failures
        );
    }

    signal
}

pub async fn check(config: Arc<ConfigModel>) -> Result<(), CliError> {
    let services = Services::production(&config)?;
    let manager = ReferralManager::new(config, services);

    if !manager.should_check_referral_activity() {
        println!("activity check not due ({})", manager.state().phase());
        return Ok(());
    }

    manager.check_referral_activity();
    manager.settle().await;

    println!("{}", manager.state().phase());

    Ok(())
}
