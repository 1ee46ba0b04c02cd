use log::{error, info};
use std::process::ExitCode;
use std::thread;

mod config;
mod connectivity;
mod error;
mod integrations;
mod logging;
mod models;
mod sync;

use crate::config::Config;
use crate::connectivity::{ConnectivityGate, HttpProbe};
use crate::error::SyncError;
use crate::integrations::google::GoogleTasks;
use crate::integrations::reminders::AppleReminders;
use crate::sync::{AccountOutcome, SyncOptions};

fn main() -> ExitCode {
    let config = Config::load();

    // Keep the handle alive until exit so buffered file output is flushed.
    let _logger = match logging::init(&config.log) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("{err}");
            None
        }
    };

    match run(&config) {
        Ok(outcomes) => {
            let failed: Vec<&str> = outcomes
                .iter()
                .filter(|outcome| outcome.result.is_err())
                .map(|outcome| outcome.binding.email.as_str())
                .collect();
            if failed.is_empty() {
                info!("Sync finished for {} account(s).", outcomes.len());
                ExitCode::SUCCESS
            } else {
                error!("Sync finished with failures for: {}", failed.join(", "));
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            error!("{}", err.message());
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<Vec<AccountOutcome>, SyncError> {
    config.validate()?;

    let probe = HttpProbe::new(&config.connectivity.probe_url, config.probe_timeout())?;
    let gate = ConnectivityGate::new(config.sync.retry_count, config.retry_delay());
    let store = AppleReminders::default();
    let options = SyncOptions {
        purge_on_remote_failure: config.sync.purge_on_remote_failure,
    };

    gate.run(&probe, thread::sleep, || {
        sync::sync_all(&config.accounts, &store, options, |binding| {
            GoogleTasks::authorize(config, &binding.email)
        })
    })
}
