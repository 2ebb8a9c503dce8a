use crate::{
    ops::{
        endpoint::{ACTIVITY_PATH, EndpointOps},
        http::HttpOps,
        json::JsonOps,
    },
    policy::activity::{ActivityDecision, AttemptSnapshot, plan_activity_check},
    workflow::{prelude::*, timer::TimerWorkflow},
};
use std::{rc::Rc, time::Duration};

///
/// ActivityWorkflow
///
/// Bounded activity confirmation: the gate consumes an attempt, the check
/// asks the server whether the referral has been finalized.
///

pub(crate) struct ActivityWorkflow;

impl ActivityWorkflow {
    /// Arm the poll timer unless it is disabled by configuration.
    pub(crate) fn start(core: &Rc<Core>) {
        let secs = core.referral().activity_check_interval_secs;
        if secs == 0 {
            log!(Topic::Activity, Info, "activity poll disabled");
            return;
        }

        let period = Duration::from_secs(secs);
        let weak = Rc::downgrade(core);

        let scheduled = TimerWorkflow::set_guarded_interval(
            &core.timers.activity,
            period,
            period,
            "activity:poll",
            move || {
                let weak = weak.clone();
                async move {
                    if let Some(core) = Core::live(&weak) {
                        Self::poll(&core);
                    }
                }
            },
        );

        if scheduled {
            log!(Topic::Activity, Info, "activity poll armed (every {secs}s)");
        }
    }

    pub(crate) fn stop(core: &Core) {
        if TimerWorkflow::clear_guarded(&core.timers.activity) {
            log!(Topic::Activity, Debug, "activity poll disarmed");
        }
    }

    // skip before the gate so an in-flight check never costs an attempt
    fn poll(core: &Rc<Core>) {
        if core.in_flight.is_set(OpKind::Activity) {
            log!(Topic::Activity, Debug, "activity check in flight; poll skipped");
            return;
        }

        if Self::should_check(core) {
            Self::spawn_check(core);
        }
    }

    // -------------------------------------------------------------
    // Gate
    // -------------------------------------------------------------

    /// Apply the gate's decision and persist its bookkeeping.
    /// True only when the caller should issue a check now.
    pub(crate) fn should_check(core: &Core) -> bool {
        let store = core.store();
        let now = core.now();
        let decision = plan_activity_check(AttemptSnapshot::from(&store.load()), now);

        let persisted = match decision {
            ActivityDecision::Inactive | ActivityDecision::Confirmed => Ok(()),

            ActivityDecision::Throttled { next_eligible } => {
                log!(
                    Topic::Activity,
                    Debug,
                    "activity check throttled until {next_eligible}"
                );
                Ok(())
            }

            ActivityDecision::Expire => {
                log!(
                    Topic::Activity,
                    Warn,
                    "activity never confirmed; abandoning referral"
                );
                store.expire()
            }

            ActivityDecision::Check { attempt } => {
                log!(Topic::Activity, Info, "activity check attempt {attempt}");
                store.record_attempt(now, attempt)
            }
        };

        match persisted.at(ErrorOrigin::Store) {
            Ok(()) => decision.should_check(),
            Err(err) => {
                log!(Topic::Activity, Error, "activity gate could not persist: {err}");
                false
            }
        }
    }

    // -------------------------------------------------------------
    // Check
    // -------------------------------------------------------------

    /// Issue one activity check. False when nothing was sent.
    pub(crate) fn spawn_check(core: &Rc<Core>) -> bool {
        if core.is_stopped() {
            return false;
        }

        let download_id = core.store().download_id();
        if download_id.is_empty() {
            log!(Topic::Activity, Debug, "no download id; activity check skipped");
            return false;
        }

        let Some(guard) = InFlightGuard::try_begin(core, OpKind::Activity) else {
            log!(Topic::Activity, Debug, "activity check already in flight; skipped");
            return false;
        };

        let body = EndpointOps::activity_payload(&core.api_key(), &download_id);
        let request = HttpOps::put_json(
            core.url(ACTIVITY_PATH),
            &body,
            core.referral().max_response_bytes,
            "activity",
        );
        let fetcher = Rc::clone(&core.services.fetcher);
        let weak = Rc::downgrade(core);

        core.spawn_tracked(async move {
            let _guard = guard;

            let res = HttpOps::fetch_ok(&*fetcher, request)
                .await
                .at(ErrorOrigin::Activity);

            let Some(core) = Core::live(&weak) else {
                return;
            };

            match res.and_then(|response| Self::apply(&core, &response.body)) {
                Ok(true) => log!(Topic::Activity, Ok, "referral activity confirmed"),
                Ok(false) => log!(Topic::Activity, Info, "referral activity not finalized yet"),
                Err(err) => log!(Topic::Activity, Error, "activity check failed: {err}"),
            }
        });

        true
    }

    fn apply(core: &Core, body: &str) -> Result<bool, Error> {
        let obj = JsonOps::parse_object(body).at(ErrorOrigin::Activity)?;

        // absent or mistyped means not finalized; the attempt stays consumed
        let finalized = matches!(obj.optional_bool("finalized"), Ok(Some(true)));
        if !finalized {
            return Ok(false);
        }

        core.store().confirm(core.now()).at(ErrorOrigin::Store)?;

        Ok(true)
    }
}
