use crate::{
    ops::{endpoint::HEADERS_PATH, http::HttpOps, json::JsonOps},
    workflow::{prelude::*, timer::TimerWorkflow},
};
use std::{rc::Rc, time::Duration};

/// Fixed period of the header refresh.
pub const HEADER_REFRESH_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

///
/// HeaderRefreshWorkflow
///
/// Daily refresh of the opaque custom headers. Failures are logged and the
/// next tick retries; persisted headers only change on a valid array.
///

pub(crate) struct HeaderRefreshWorkflow;

impl HeaderRefreshWorkflow {
    pub(crate) fn start(core: &Rc<Core>) {
        let weak = Rc::downgrade(core);

        let scheduled = TimerWorkflow::set_guarded_interval(
            &core.timers.headers,
            HEADER_REFRESH_PERIOD,
            HEADER_REFRESH_PERIOD,
            "headers:refresh",
            move || {
                let weak = weak.clone();
                async move {
                    if let Some(core) = Core::live(&weak) {
                        Self::spawn(&core);
                    }
                }
            },
        );

        if scheduled {
            log!(
                Topic::Headers,
                Info,
                "header refresh armed (every {}s)",
                HEADER_REFRESH_PERIOD.as_secs()
            );
        }
    }

    pub(crate) fn stop(core: &Core) {
        if TimerWorkflow::clear_guarded(&core.timers.headers) {
            log!(Topic::Headers, Debug, "header refresh disarmed");
        }
    }

    /// Issue one refresh. False when stopped or a refresh is already in flight.
    pub(crate) fn spawn(core: &Rc<Core>) -> bool {
        if core.is_stopped() {
            return false;
        }
        let Some(guard) = InFlightGuard::try_begin(core, OpKind::Headers) else {
            log!(Topic::Headers, Debug, "header refresh already in flight; skipped");
            return false;
        };

        let weak = Rc::downgrade(core);
        core.spawn_tracked(async move {
            let _guard = guard;

            let Some(core) = Core::live(&weak) else {
                return;
            };
            let request = HttpOps::get(
                core.url(HEADERS_PATH),
                core.referral().max_response_bytes,
                "headers",
            );
            let fetcher = Rc::clone(&core.services.fetcher);
            drop(core);

            let res = HttpOps::fetch_ok(&*fetcher, request)
                .await
                .at(ErrorOrigin::Headers);

            // stopped while the request was out
            let Some(core) = Core::live(&weak) else {
                return;
            };

            match res.and_then(|response| Self::apply(&core, &response.body)) {
                Ok(count) => log!(Topic::Headers, Ok, "stored {count} referral header(s)"),
                Err(err) => log!(
                    Topic::Headers,
                    Error,
                    "failed to fetch headers from referral server: {err}"
                ),
            }
        });

        true
    }

    fn apply(core: &Core, body: &str) -> Result<usize, Error> {
        let headers = JsonOps::parse_array(body).at(ErrorOrigin::Headers)?;
        let count = headers.len();

        core.store()
            .replace_headers(headers)
            .at(ErrorOrigin::Store)?;

        Ok(count)
    }
}
