//! procvisor binary: CLI surface, tracing setup, exit-code policy.
//!
//! Exit codes: 0 after a reconciled stop (including prepare-only runs);
//! non-zero on a fatal startup or loop error, but cleanup runs first either
//! way, so no worker outlives the supervisor.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use procvisor::{
    catalog, hardware, signals, Bus, Manager, ManagerConfig, ManagerError, ParamRegistrar,
    ParamStore,
};

#[derive(Parser, Debug)]
#[command(name = "procvisor", version, about = "Worker-process supervisor")]
struct Cli {
    /// Param store root directory.
    #[arg(long, default_value = "/data/params")]
    params_root: PathBuf,

    /// Run init (clears, defaults, registration, prepare) and exit.
    #[arg(long, env = "PREPAREONLY")]
    prepare_only: bool,

    /// Skip the board subsystem; removes board workers from the enabled set.
    #[arg(long, env = "NOBOARD")]
    no_board: bool,

    /// Comma-delimited worker names to force-disable regardless of policy.
    #[arg(long, env = "BLOCK", value_delimiter = ',')]
    block: Vec<String>,

    /// Bounded wait for the device-state feed, per tick.
    #[arg(long, default_value_t = 1000)]
    tick_timeout_ms: u64,

    /// Treat this build as a release channel (clears development-only params).
    #[arg(long)]
    release: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = ManagerConfig {
        tick_timeout: std::time::Duration::from_millis(cli.tick_timeout_ms),
        block: cli.block.iter().cloned().collect::<HashSet<_>>(),
        no_board: cli.no_board,
        release_channel: cli.release,
        ..Default::default()
    };

    let params = match ParamStore::open(&cli.params_root) {
        Ok(p) => p,
        Err(e) => {
            // nothing was started; cleanup would be a no-op
            error!(error = %e, "fatal startup failure");
            return ExitCode::FAILURE;
        }
    };

    let bus = Bus::new(cfg.bus_capacity);
    let registrar = ParamRegistrar::new(params.clone());
    let mut mgr = Manager::new(cfg.clone(), params, catalog::default_specs(), bus);

    if let Err(e) = mgr.init(&registrar).await {
        error!(label = e.as_label(), error = %e, "manager failed to start");
        mgr.cleanup().await;
        return ExitCode::FAILURE;
    }

    if cli.prepare_only {
        info!("prepare complete");
        return ExitCode::SUCCESS;
    }

    let cancel = CancellationToken::new();
    if let Err(e) = signals::watch(cancel.clone()) {
        let e = ManagerError::SignalInstall(e);
        error!(label = e.as_label(), error = %e, "manager failed to start");
        mgr.cleanup().await;
        return ExitCode::FAILURE;
    }

    let res = mgr.run(cancel).await;
    mgr.cleanup().await;

    if let Some(action) = hardware::pending_action(mgr.params()) {
        // execution is external and irreversible; we only hand over the decision
        warn!(?action, "deferring to hardware action");
    }

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(label = e.as_label(), error = %e, "manager loop failed");
            ExitCode::FAILURE
        }
    }
}
