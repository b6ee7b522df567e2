//! The supervisor: owns timing, edge detection, transition-scoped clears,
//! reconciliation, heartbeat, and the shutdown sequence.
//!
//! ## Lifecycle
//! ```text
//! Manager::init()
//!   ├─► clear_all(ManagerStart / OnroadTransition / OffroadTransition)
//!   │     └─► + DevelopmentOnly on release channels
//!   ├─► seed defaults (set-if-missing), write version + build metadata params
//!   ├─► registrar.register() ── hard failure aborts startup
//!   └─► prepare() every worker, enabled or not
//!
//! Manager::run(cancel)
//!   ├─► write_onroad_params(false)      (defined baseline for edge detection)
//!   ├─► initial reconcile (started = false)
//!   └─► loop, one tick per device-state sample (bounded wait, default 1 s):
//!         ├─► edge false→true: clear_all(OnroadTransition)
//!         ├─► edge true→false: clear_all(OffroadTransition)
//!         ├─► any edge: write_onroad_params(started)   (before reconciling)
//!         ├─► reconciler.ensure_running(DesiredState)
//!         ├─► publish ManagerState heartbeat
//!         └─► scan shutdown flags ── any set: record reason, break
//!
//! Manager::cleanup()                    (always runs, even on loop-fatal)
//!   └─► stop fan-out, then blocking confirmation per worker
//! ```
//!
//! ## Rules
//! - Single logical thread: the loop is the sole writer of the param store and
//!   sole owner of worker runtimes. No locks in this core.
//! - Cancellation is level-triggered: a termination signal aborts the current
//!   wait and goes straight to cleanup, no further ticks.
//! - Shutdown reason: flags are scanned in fixed order and the FIRST match is
//!   recorded; every match still forces the loop to exit.

use tokio::sync::broadcast;
use tokio::time::{self, Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::error::ManagerError;
use crate::messaging::{Bus, Message};
use crate::params::{defaults, Category, ParamStore};
use crate::reconcile::{DesiredState, Reconciler};
use crate::registration::{DongleId, Registrar};
use crate::workers::WorkerSpec;

/// Shutdown flags, in the scan order that decides the recorded reason.
const SHUTDOWN_FLAGS: &[&str] = &["DoUninstall", "DoReboot", "DoShutdown", "DoFactoryReset"];

/// The worker-fleet supervisor.
pub struct Manager {
    cfg: ManagerConfig,
    params: ParamStore,
    bus: Bus,
    reconciler: Reconciler,
    dongle: Option<DongleId>,
    car_params: Option<String>,
}

impl Manager {
    pub fn new(cfg: ManagerConfig, params: ParamStore, specs: Vec<WorkerSpec>, bus: Bus) -> Self {
        Self {
            cfg,
            params,
            bus,
            reconciler: Reconciler::new(specs),
            dongle: None,
            car_params: None,
        }
    }

    /// Startup: lifecycle clears, default seeding, identity, worker prepare.
    ///
    /// # Errors
    /// [`ManagerError::Registration`] on a hard identity failure and
    /// [`ManagerError::Store`] on an unreachable store; both abort startup
    /// before any worker is started.
    pub async fn init(&mut self, registrar: &dyn Registrar) -> Result<(), ManagerError> {
        self.params.clear_all(Category::ManagerStart);
        self.params.clear_all(Category::OnroadTransition);
        self.params.clear_all(Category::OffroadTransition);
        if self.cfg.release_channel {
            self.params.clear_all(Category::DevelopmentOnly);
        }

        for (key, value) in defaults::DEFAULT_PARAMS {
            self.params.ensure_default(key, value)?;
        }
        self.params.put("Version", env!("CARGO_PKG_VERSION"))?;
        self.params.put("GitCommit", defaults::GIT_COMMIT)?;
        self.params.put("GitBranch", defaults::GIT_BRANCH)?;
        self.params.put("GitRemote", defaults::GIT_REMOTE)?;
        self.params.put("TermsVersion", defaults::TERMS_VERSION)?;
        self.params.put("TrainingVersion", defaults::TRAINING_VERSION)?;

        let dongle = registrar.register()?;
        info!(dongle_id = %dongle, registered = dongle.is_registered(), "device identity resolved");
        self.dongle = Some(dongle);

        self.reconciler.registry_mut().prepare_all().await;
        Ok(())
    }

    /// The control loop. Returns when a shutdown flag is set or `cancel` fires.
    ///
    /// # Errors
    /// Only store write failures escape; the caller must still run
    /// [`Manager::cleanup`] on that path.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), ManagerError> {
        let mut rx = self.bus.subscribe();
        info!(workers = self.reconciler.registry().len(), "manager start");

        self.write_onroad_params(false)?;
        let mut started_prev = false;

        let state = self.desired_state(false);
        self.reconciler.ensure_running(&state).await;

        loop {
            let started = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("termination signal, leaving loop");
                    break;
                }
                s = Self::wait_device_state(
                    &mut rx,
                    started_prev,
                    self.cfg.tick_timeout,
                    &mut self.car_params,
                ) => s,
            };

            if self.tick(started, started_prev).await?.is_some() {
                break;
            }
            started_prev = started;
        }
        Ok(())
    }

    /// Shutdown sequencer: stop everything, best-effort first, then confirmed.
    ///
    /// Always safe to call, including after a failed startup (no workers
    /// running → every stop is a no-op).
    pub async fn cleanup(&mut self) {
        self.reconciler.stop_all().await;
    }

    /// Param store handle (post-run hardware-action decision, diagnostics).
    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    /// One tick after a fresh `started` sample: edges, clears, reconcile,
    /// heartbeat, shutdown-flag scan. Returns the recorded shutdown flag, if
    /// any fired.
    async fn tick(
        &mut self,
        started: bool,
        started_prev: bool,
    ) -> Result<Option<&'static str>, ManagerError> {
        if started != started_prev {
            if started {
                info!("onroad transition");
                self.params.clear_all(Category::OnroadTransition);
            } else {
                info!("offroad transition");
                self.params.clear_all(Category::OffroadTransition);
            }
            // safety-parameter writers observe the new state before any
            // worker is started or stopped for it
            self.write_onroad_params(started)?;
        }

        let state = self.desired_state(started);
        self.reconciler.ensure_running(&state).await;

        let snapshot = self.reconciler.snapshot();
        debug!(
            state = %serde_json::to_string(&snapshot).unwrap_or_default(),
            "heartbeat"
        );
        self.bus.publish(Message::ManagerState(snapshot));

        self.scan_shutdown_flags()
    }

    /// Bounded wait for the next device-state sample. Car-params messages are
    /// folded into the passthrough slot along the way; a stalled or lagging
    /// feed yields the previous value so the loop stays live.
    async fn wait_device_state(
        rx: &mut broadcast::Receiver<Message>,
        prev: bool,
        timeout: Duration,
        car_params: &mut Option<String>,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match time::timeout_at(deadline, rx.recv()).await {
                Ok(Ok(Message::DeviceState { started })) => return started,
                Ok(Ok(Message::CarParams { raw })) => *car_params = Some(raw),
                Ok(Ok(Message::ManagerState(_))) => {}
                Ok(Err(broadcast::error::RecvError::Lagged(n))) => {
                    warn!(skipped = n, "device-state feed lagged");
                }
                Ok(Err(broadcast::error::RecvError::Closed)) => return prev,
                Err(_elapsed) => return prev,
            }
        }
    }

    fn desired_state(&self, started: bool) -> DesiredState {
        DesiredState {
            onroad: started,
            registered: self.dongle.as_ref().is_some_and(DongleId::is_registered),
            is_clone: self.params.get_bool("DeviceIsClone"),
            dm_unavailable: self.params.get_bool("DmHardwareUnavailable"),
            no_board: self.cfg.no_board,
            block: self.cfg.block.clone(),
            car_params: self.car_params.clone(),
        }
    }

    fn write_onroad_params(&self, started: bool) -> Result<(), ManagerError> {
        self.params.put_bool("IsOnroad", started)?;
        self.params.put_bool("IsOffroad", !started)
    }

    /// Scans the shutdown flags in fixed order. The first observed flag names
    /// the recorded exit reason; all observed flags force shutdown. A factory
    /// reset additionally wipes every non-persistent param.
    fn scan_shutdown_flags(&self) -> Result<Option<&'static str>, ManagerError> {
        let mut reason: Option<&'static str> = None;
        for flag in SHUTDOWN_FLAGS.iter().copied() {
            if self.params.get_bool(flag) {
                if flag == "DoFactoryReset" {
                    warn!("factory reset requested, wiping non-persistent params");
                    self.params.wipe_non_persistent();
                }
                reason.get_or_insert(flag);
            }
        }
        if let Some(flag) = reason {
            warn!(flag, "shutting down manager");
            self.params.put(
                "LastManagerExitReason",
                &format!("{flag} {}", chrono::Utc::now()),
            )?;
        }
        Ok(reason)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::registration::ParamRegistrar;
    use crate::workers::testing::{FakeState, FakeWorker};
    use crate::workers::EnablePolicy;

    type Handle = Arc<Mutex<FakeState>>;

    fn build(cfg: ManagerConfig) -> (Manager, ParamStore, Bus, Handle, Handle, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let params = ParamStore::open(dir.path()).unwrap();
        let bus = Bus::new(cfg.bus_capacity);

        let (uploader, uploader_state) = FakeWorker::new("uploader");
        let (modeld, modeld_state) = FakeWorker::new("modeld");
        let specs = vec![
            WorkerSpec::new(
                Box::new(uploader),
                EnablePolicy::always().needs_registration(),
            ),
            WorkerSpec::new(Box::new(modeld), EnablePolicy::onroad_only()),
        ];

        let mgr = Manager::new(cfg, params.clone(), specs, bus.clone());
        (mgr, params, bus, uploader_state, modeld_state, dir)
    }

    fn fast_cfg() -> ManagerConfig {
        ManagerConfig {
            tick_timeout: Duration::from_millis(100),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn init_seeds_defaults_and_prepares_every_worker() {
        let (mut mgr, params, _bus, uploader, modeld, _dir) = build(fast_cfg());
        params.put("DongleId", "abc123").unwrap();
        // operator already accepted terms; the default must not win
        params.put("HasAcceptedTerms", "1").unwrap();

        mgr.init(&ParamRegistrar::new(params.clone())).await.unwrap();

        assert_eq!(params.get("CompletedTrainingVersion").as_deref(), Some("0"));
        assert_eq!(params.get("HasAcceptedTerms").as_deref(), Some("1"));
        assert_eq!(
            params.get("Version").as_deref(),
            Some(env!("CARGO_PKG_VERSION"))
        );
        // build metadata is recorded unconditionally, even on a plain build
        assert_eq!(params.get("GitCommit").as_deref(), Some(defaults::GIT_COMMIT));
        assert_eq!(params.get("GitBranch").as_deref(), Some(defaults::GIT_BRANCH));
        assert_eq!(params.get("GitRemote").as_deref(), Some(defaults::GIT_REMOTE));
        // prepare runs for every spec, enabled or not
        assert_eq!(uploader.lock().unwrap().prepares, 1);
        assert_eq!(modeld.lock().unwrap().prepares, 1);
    }

    #[tokio::test]
    async fn init_aborts_on_registration_failure() {
        let (mut mgr, params, _bus, uploader, _modeld, _dir) = build(fast_cfg());
        // no DongleId seeded → hard failure
        let err = mgr
            .init(&ParamRegistrar::new(params.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "registration_failed");
        assert_eq!(uploader.lock().unwrap().starts, 0);

        // cleanup after a failed startup is a no-op
        mgr.cleanup().await;
        assert!(!uploader.lock().unwrap().alive);
    }

    #[tokio::test]
    async fn transition_clears_fire_exactly_once_per_edge() {
        let (mut mgr, params, bus, uploader, modeld, _dir) = build(fast_cfg());
        params.put("DongleId", "abc123").unwrap();
        mgr.init(&ParamRegistrar::new(params.clone())).await.unwrap();

        let mut rx = bus.subscribe();

        params.put("CarParams", "cp").unwrap();
        params.put("Offroad_ConnectivityNeeded", "1").unwrap();

        // started sequence [false, false, true, true, false]
        let mut prev = false;
        for (i, started) in [false, false, true, true, false].into_iter().enumerate() {
            // re-seed the onroad-scoped marker after the clear at index 2
            if i == 3 {
                params.put("CarParams", "cp2").unwrap();
            }
            assert_eq!(mgr.tick(started, prev).await.unwrap(), None);
            prev = started;

            match i {
                0 | 1 => {
                    assert!(params.get("CarParams").is_some(), "no clear before an edge");
                }
                2 => {
                    assert_eq!(params.get("CarParams"), None, "onroad clear at the edge");
                    assert!(params.get("Offroad_ConnectivityNeeded").is_some());
                }
                3 => {
                    // repeated true sample: no second clear
                    assert!(params.get("CarParams").is_some());
                }
                4 => {
                    assert_eq!(
                        params.get("Offroad_ConnectivityNeeded"),
                        None,
                        "offroad clear at the edge"
                    );
                    assert!(params.get("CarParams").is_some());
                }
                _ => unreachable!(),
            }
        }

        // onroad params tracked the last edge
        assert!(!params.get_bool("IsOnroad"));
        assert!(params.get_bool("IsOffroad"));

        // one heartbeat per tick, with should_run matching the predicates
        let expected = [false, false, true, true, false];
        for started in expected {
            let msg = rx.try_recv().unwrap();
            let Message::ManagerState(snap) = msg else {
                panic!("expected a heartbeat");
            };
            assert!(snap.worker("uploader").unwrap().should_run);
            assert_eq!(snap.worker("modeld").unwrap().should_run, started);
        }

        // reconciliation matched the heartbeat
        assert!(uploader.lock().unwrap().alive);
        assert!(!modeld.lock().unwrap().alive);
        assert_eq!(modeld.lock().unwrap().starts, 1);
        assert_eq!(modeld.lock().unwrap().stops, 1);
    }

    #[tokio::test]
    async fn first_matching_flag_names_the_exit_reason() {
        let (mut mgr, params, _bus, _uploader, _modeld, _dir) = build(fast_cfg());
        params.put("DongleId", "abc123").unwrap();
        mgr.init(&ParamRegistrar::new(params.clone())).await.unwrap();

        params.put_bool("DoShutdown", true).unwrap();
        params.put_bool("DoReboot", true).unwrap();

        let reason = mgr.tick(false, false).await.unwrap();
        assert_eq!(reason, Some("DoReboot"), "fixed scan order decides");
        let recorded = params.get("LastManagerExitReason").unwrap();
        assert!(recorded.starts_with("DoReboot "), "got {recorded:?}");
    }

    #[tokio::test]
    async fn factory_reset_wipes_and_exits() {
        let (mut mgr, params, _bus, _uploader, _modeld, _dir) = build(fast_cfg());
        params.put("DongleId", "abc123").unwrap();
        mgr.init(&ParamRegistrar::new(params.clone())).await.unwrap();

        params.put("SomethingAdHoc", "x").unwrap();
        params.put_bool("DoFactoryReset", true).unwrap();

        let reason = mgr.tick(false, false).await.unwrap();
        assert_eq!(reason, Some("DoFactoryReset"));
        assert_eq!(params.get("SomethingAdHoc"), None);
        assert_eq!(params.get("DongleId").as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn shutdown_flag_stops_the_loop_and_the_fleet() {
        let (mut mgr, params, bus, uploader, modeld, _dir) = build(fast_cfg());
        params.put("DongleId", "abc123").unwrap();
        mgr.init(&ParamRegistrar::new(params.clone())).await.unwrap();

        params.put_bool("DoShutdown", true).unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(async move {
            let res = mgr.run(cancel).await;
            mgr.cleanup().await;
            res
        });

        // nudge the loop; even if this publish races the subscribe, the
        // bounded wait falls through and the flag is still observed
        bus.publish(Message::DeviceState { started: false });

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop must exit within a tick")
            .unwrap()
            .unwrap();

        assert!(!uploader.lock().unwrap().alive);
        assert!(!modeld.lock().unwrap().alive);
        assert_eq!(uploader.lock().unwrap().blocking_stops, 1);
        assert!(params
            .get("LastManagerExitReason")
            .unwrap()
            .starts_with("DoShutdown"));
    }

    #[tokio::test]
    async fn cancellation_goes_straight_to_cleanup() {
        let (mut mgr, params, bus, uploader, _modeld, _dir) = build(fast_cfg());
        params.put("DongleId", "abc123").unwrap();
        mgr.init(&ParamRegistrar::new(params.clone())).await.unwrap();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let res = mgr.run(token).await;
            mgr.cleanup().await;
            res
        });

        bus.publish(Message::DeviceState { started: false });
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("cancellation must abort the wait")
            .unwrap()
            .unwrap();

        assert!(!uploader.lock().unwrap().alive);
    }
}
