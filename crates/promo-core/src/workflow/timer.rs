use crate::workflow::prelude::*;
use std::{cell::RefCell, future::Future, time::Duration};
use tokio::{
    task::AbortHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

///
/// TimerId
/// Opaque handle to a repeating timer task.
///

#[derive(Debug)]
pub struct TimerId {
    handle: AbortHandle,
}

///
/// TimerSlots
/// One guarded slot per recurring job of the manager.
///

#[derive(Debug, Default)]
pub struct TimerSlots {
    pub headers: RefCell<Option<TimerId>>,
    pub activity: RefCell<Option<TimerId>>,
}

///
/// TimerWorkflow
///

pub struct TimerWorkflow;

impl TimerWorkflow {
    /// Schedules a repeating timer on the local task set.
    /// The task is a closure that produces a fresh Future on each tick; the
    /// first tick fires after `first_delay`, then every `period`.
    pub fn set_interval<F, Fut>(
        first_delay: Duration,
        period: Duration,
        label: &'static str,
        mut task: F,
    ) -> TimerId
    where
        F: FnMut() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let first = Instant::now() + first_delay;

        let handle = tokio::task::spawn_local(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                log!(Topic::Timer, Debug, "{label}: tick");

                task().await;
            }
        });

        log!(
            Topic::Timer,
            Debug,
            "{label}: scheduled every {}s (first in {}s)",
            period.as_secs(),
            first_delay.as_secs()
        );

        TimerId {
            handle: handle.abort_handle(),
        }
    }

    /// Cancels a timer. A tick that is mid-flight is dropped at its next await.
    pub fn clear(id: TimerId) {
        id.handle.abort();
    }

    /// Schedule only if the slot is empty.
    /// Returns true when a new timer was scheduled.
    pub fn set_guarded_interval<F, Fut>(
        slot: &RefCell<Option<TimerId>>,
        first_delay: Duration,
        period: Duration,
        label: &'static str,
        task: F,
    ) -> bool
    where
        F: FnMut() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let mut entry = slot.borrow_mut();
        if entry.is_some() {
            return false;
        }

        *entry = Some(Self::set_interval(first_delay, period, label, task));
        true
    }

    /// Clear a guarded timer slot if present.
    /// Returns true when a timer was cleared.
    #[must_use]
    pub fn clear_guarded(slot: &RefCell<Option<TimerId>>) -> bool {
        slot.borrow_mut().take().is_some_and(|id| {
            Self::clear(id);
            true
        })
    }
}

///
/// TESTS
///
