use crate::storage::ReferralState;

/// Checks allowed before a pending referral is abandoned.
pub const ACTIVITY_ATTEMPT_CAP: u32 = 30;

/// Minimum spacing between two activity checks.
pub const ACTIVITY_RETRY_SECS: u64 = 24 * 60 * 60;

///
/// AttemptSnapshot
/// The slice of referral state the activity gate looks at.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AttemptSnapshot {
    pub has_download_id: bool,
    pub confirmed: bool,
    pub attempt_count: u32,
    pub last_attempt: Option<u64>,
}

impl From<&ReferralState> for AttemptSnapshot {
    fn from(state: &ReferralState) -> Self {
        Self {
            has_download_id: !state.download_id.is_empty(),
            confirmed: state.confirmed_timestamp.is_some(),
            attempt_count: state.attempt_count,
            last_attempt: state.last_attempt_timestamp,
        }
    }
}

///
/// ActivityDecision
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ActivityDecision {
    /// No download id; nothing to check.
    Inactive,

    /// Already confirmed; never check again.
    Confirmed,

    /// Cap reached: clear attempt fields and the download id.
    Expire,

    /// Checked too recently.
    Throttled { next_eligible: u64 },

    /// Record attempt number `attempt` at `now` and run the check.
    Check { attempt: u32 },
}

impl ActivityDecision {
    #[must_use]
    pub const fn should_check(&self) -> bool {
        matches!(self, Self::Check { .. })
    }
}

///
/// plan_activity_check
/// Evaluate the gate's decision table, in order.
///

#[must_use]
pub fn plan_activity_check(snapshot: AttemptSnapshot, now: u64) -> ActivityDecision {
    if !snapshot.has_download_id {
        return ActivityDecision::Inactive;
    }

    if snapshot.confirmed {
        return ActivityDecision::Confirmed;
    }

    if snapshot.attempt_count >= ACTIVITY_ATTEMPT_CAP {
        return ActivityDecision::Expire;
    }

    // a missing timestamp is the epoch, i.e. long enough ago
    let last = snapshot.last_attempt.unwrap_or(0);
    if now.saturating_sub(last) < ACTIVITY_RETRY_SECS {
        return ActivityDecision::Throttled {
            next_eligible: last.saturating_add(ACTIVITY_RETRY_SECS),
        };
    }

    ActivityDecision::Check {
        attempt: snapshot.attempt_count + 1,
    }
}

///
/// TESTS
///
