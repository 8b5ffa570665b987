//! Per-run setup: home directory, config, logging and the contract manager.

use anyhow::{Context, Result};
use salecontract::{Config, ContractManager, StateStore};
use salecontract_logging::{init_logging, logs_dir, salecontract_home, LogConfig};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct ContextArgs {
    pub home: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
    pub verbose: bool,
}

pub struct CliContext {
    pub manager: ContractManager<Box<dyn StateStore>>,
}

impl CliContext {
    pub fn setup(args: ContextArgs) -> Result<Self> {
        let home = args.home.unwrap_or_else(salecontract_home);
        fs::create_dir_all(&home)
            .with_context(|| format!("Failed to create home directory: {}", home.display()))?;

        let config = Config::load(&home)?.with_store_dir(args.store_dir);

        let log_dir = logs_dir(&home);
        init_logging(LogConfig {
            app_name: "salecontract",
            log_dir: &log_dir,
            filter: config.logging.filter.as_deref(),
            verbose: args.verbose,
        })?;

        let store = config.open_store(&home)?;
        debug!(
            home = %home.display(),
            backend = config.store.backend.as_str(),
            "Opened state store"
        );

        // Created after logging is installed so it picks up that subscriber.
        let manager = ContractManager::new(store);

        Ok(Self { manager })
    }
}
