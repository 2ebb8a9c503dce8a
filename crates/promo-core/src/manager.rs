use crate::{
    config::{ConfigModel, schema::ReferralConfig},
    error::{Classified, Error, ErrorClass, ErrorContext, ErrorOrigin},
    interface::{Clock, EnvReader, HttpFetcher, PrefStore, PromoCodeFile, UrlLauncher},
    log,
    log::Topic,
    ops::{
        endpoint::EndpointOps,
        metrics::{HttpMetrics, HttpMetricsSnapshot},
    },
    storage::{ReferralState, ReferralStore},
    workflow::{
        activity::ActivityWorkflow, headers::HeaderRefreshWorkflow, init::FirstRunWorkflow,
        timer::TimerSlots,
    },
};
use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    future::Future,
    rc::{Rc, Weak},
    sync::Arc,
};
use thiserror::Error as ThisError;
use tokio::task::JoinHandle;

///
/// ManagerError
///

#[derive(Debug, ThisError)]
pub enum ManagerError {
    #[error("referral manager already started")]
    AlreadyStarted,

    #[error("referral manager has been stopped")]
    Stopped,
}

impl Classified for ManagerError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Lifecycle
    }
}

///
/// Services
/// The collaborators a manager talks to.
///

#[derive(Clone)]
pub struct Services {
    pub store: Rc<dyn PrefStore>,
    pub fetcher: Rc<dyn HttpFetcher>,
    pub promo_file: Arc<dyn PromoCodeFile>,
    pub env: Rc<dyn EnvReader>,
    pub launcher: Rc<dyn UrlLauncher>,
    pub clock: Rc<dyn Clock>,
}

///
/// OpKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OpKind {
    Headers,
    Init,
    Activity,
}

///
/// InFlight
/// One outstanding request per kind.
///

#[derive(Debug, Default)]
pub(crate) struct InFlight {
    headers: Cell<bool>,
    init: Cell<bool>,
    activity: Cell<bool>,
}

impl InFlight {
    const fn flag(&self, kind: OpKind) -> &Cell<bool> {
        match kind {
            OpKind::Headers => &self.headers,
            OpKind::Init => &self.init,
            OpKind::Activity => &self.activity,
        }
    }

    pub(crate) fn is_set(&self, kind: OpKind) -> bool {
        self.flag(kind).get()
    }
}

///
/// InFlightGuard
/// Clears its flag when the owning task finishes, however it finishes.
///

pub(crate) struct InFlightGuard {
    core: Weak<Core>,
    kind: OpKind,
}

impl InFlightGuard {
    pub(crate) fn try_begin(core: &Rc<Core>, kind: OpKind) -> Option<Self> {
        let flag = core.in_flight.flag(kind);
        if flag.get() {
            return None;
        }
        flag.set(true);

        Some(Self {
            core: Rc::downgrade(core),
            kind,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.in_flight.flag(self.kind).set(false);
        }
    }
}

///
/// Core
/// Shared owner state. Only ever touched from the manager's local task set.
///

pub(crate) struct Core {
    pub config: Arc<ConfigModel>,
    pub services: Services,
    pub promo_code: RefCell<String>,
    pub in_flight: InFlight,
    pub timers: TimerSlots,
    tasks: RefCell<Vec<JoinHandle<()>>>,
    started: Cell<bool>,
    stopped: Cell<bool>,
}

impl Core {
    /// Upgrade a weak handle, but only if the manager is still running.
    pub(crate) fn live(weak: &Weak<Self>) -> Option<Rc<Self>> {
        weak.upgrade().filter(|core| !core.stopped.get())
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    pub(crate) fn referral(&self) -> &ReferralConfig {
        &self.config.referral
    }

    pub(crate) fn store(&self) -> ReferralStore<'_> {
        ReferralStore::new(&*self.services.store)
    }

    pub(crate) fn now(&self) -> u64 {
        self.services.clock.now_secs()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        EndpointOps::url(self.referral(), &*self.services.env, path)
    }

    pub(crate) fn api_key(&self) -> String {
        EndpointOps::api_key(self.referral(), &*self.services.env)
    }

    /// Spawn a one-shot task on the local set and remember it for `settle`.
    pub(crate) fn spawn_tracked(&self, fut: impl Future<Output = ()> + 'static) {
        let handle = tokio::task::spawn_local(fut);

        let mut tasks = self.tasks.borrow_mut();
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }
}

///
/// ReferralManager
///
/// Owns the referral lifecycle for one installation: the daily header
/// refresh, the first-run initialization handshake and the activity-check
/// retry policy.
///
/// All methods must be called from inside a `tokio::task::LocalSet`; work is
/// spawned onto it and never blocks the caller.
///

pub struct ReferralManager {
    core: Rc<Core>,
}

impl ReferralManager {
    #[must_use]
    pub fn new(config: Arc<ConfigModel>, services: Services) -> Self {
        let core = Core {
            config,
            services,
            promo_code: RefCell::new(String::new()),
            in_flight: InFlight::default(),
            timers: TimerSlots::default(),
            tasks: RefCell::new(Vec::new()),
            started: Cell::new(false),
            stopped: Cell::new(false),
        };

        Self {
            core: Rc::new(core),
        }
    }

    // -------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------

    /// Arm the timers and kick off whichever phase the persisted state calls for.
    pub fn start(&self) -> Result<(), Error> {
        if self.core.stopped.get() {
            return Err(ManagerError::Stopped).at(ErrorOrigin::Manager);
        }
        if self.core.started.replace(true) {
            return Err(ManagerError::AlreadyStarted).at(ErrorOrigin::Manager);
        }

        HeaderRefreshWorkflow::start(&self.core);
        ActivityWorkflow::start(&self.core);

        let download_id = self.core.store().download_id();
        if download_id.is_empty() {
            log!(Topic::Manager, Info, "no download id yet; looking for a promo code");
            FirstRunWorkflow::spawn(&self.core);
        } else {
            log!(Topic::Manager, Info, "referral initialized; refreshing headers");
            HeaderRefreshWorkflow::spawn(&self.core);
        }

        Ok(())
    }

    /// Cancel the timers. In-flight requests finish but their results are
    /// dropped. A stopped manager cannot be restarted.
    pub fn stop(&self) {
        if self.core.stopped.replace(true) {
            return;
        }

        HeaderRefreshWorkflow::stop(&self.core);
        ActivityWorkflow::stop(&self.core);

        log!(Topic::Manager, Info, "referral manager stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.core.started.get() && !self.core.stopped.get()
    }

    /// Wait for every outstanding one-shot task, including ones spawned while
    /// waiting. Timers are not waited on.
    pub async fn settle(&self) {
        loop {
            let pending: Vec<_> = self.core.tasks.borrow_mut().drain(..).collect();
            if pending.is_empty() {
                break;
            }

            for handle in pending {
                if let Err(err) = handle.await {
                    log!(Topic::Manager, Error, "referral task failed: {err}");
                }
            }
        }
    }

    // -------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------

    /// Fire a header refresh now. False when one is already in flight.
    pub fn fetch_referral_headers(&self) -> bool {
        HeaderRefreshWorkflow::spawn(&self.core)
    }

    /// Activity gate; see `policy::activity`. May mutate attempt bookkeeping.
    pub fn should_check_referral_activity(&self) -> bool {
        ActivityWorkflow::should_check(&self.core)
    }

    /// Issue one activity check. Callers run the gate first.
    /// False when nothing was issued.
    pub fn check_referral_activity(&self) -> bool {
        ActivityWorkflow::spawn_check(&self.core)
    }

    // -------------------------------------------------------------
    // Views
    // -------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> ReferralState {
        let mut state = self.core.store().load();
        state.promo_code.clone_from(&self.core.promo_code.borrow());

        state
    }

    #[must_use]
    pub fn headers(&self) -> Vec<Value> {
        self.core.store().headers()
    }

    #[must_use]
    pub fn http_metrics(&self) -> HttpMetricsSnapshot {
        HttpMetrics::snapshot()
    }
}

impl Drop for ReferralManager {
    fn drop(&mut self) {
        self.stop();
    }
}
