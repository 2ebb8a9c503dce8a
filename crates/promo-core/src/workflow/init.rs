use crate::{
    interface::PromoCodeFile,
    ops::{
        endpoint::{EndpointOps, INIT_PATH, Platform},
        http::HttpOps,
        json::{JsonError, JsonObject, JsonOps},
        promo::PromoFileOps,
    },
    workflow::prelude::*,
};
use serde_json::Value;
use std::{
    rc::{Rc, Weak},
    sync::Arc,
};

///
/// InitResponse
/// A fully validated initialization reply. Nothing is persisted until one of
/// these exists.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct InitResponse {
    pub download_id: String,
    pub referral_code: String,
    pub offer_page_url: Option<String>,
    pub headers: Option<Vec<Value>>,
}

impl InitResponse {
    pub(crate) fn parse(body: &str) -> Result<Self, JsonError> {
        let obj = JsonOps::parse_object(body)?;

        Ok(Self {
            download_id: obj.required_str("download_id")?.to_string(),
            referral_code: obj.required_str("referral_code")?.to_string(),
            offer_page_url: obj.optional_str("offer_page_url")?.map(ToString::to_string),
            headers: Self::headers(&obj),
        })
    }

    // a mistyped headers field does not fail the handshake
    fn headers(obj: &JsonObject) -> Option<Vec<Value>> {
        match obj.optional_array("headers") {
            Ok(headers) => headers.cloned(),
            Err(err) => {
                log!(Topic::Init, Warn, "ignoring init headers: {err}");
                None
            }
        }
    }
}

///
/// FirstRunWorkflow
///
/// Promo-code discovery and the one-shot initialization handshake. Any
/// failure abandons the attempt until the next process start.
///

pub(crate) struct FirstRunWorkflow;

impl FirstRunWorkflow {
    /// False when stopped or already running.
    pub(crate) fn spawn(core: &Rc<Core>) -> bool {
        if core.is_stopped() {
            return false;
        }
        let Some(guard) = InFlightGuard::try_begin(core, OpKind::Init) else {
            return false;
        };

        let weak = Rc::downgrade(core);
        let promo_file = Arc::clone(&core.services.promo_file);

        core.spawn_tracked(async move {
            let _guard = guard;

            if let Err(err) = Self::run(&weak, promo_file).await {
                log!(Topic::Init, Error, "referral initialization failed: {err}");
            }
        });

        true
    }

    async fn run(weak: &Weak<Core>, promo_file: Arc<dyn PromoCodeFile>) -> Result<(), Error> {
        let code = PromoFileOps::read(Arc::clone(&promo_file))
            .await
            .at(ErrorOrigin::PromoFile)?;

        let Some(core) = Core::live(weak) else {
            return Ok(());
        };
        let Some(code) = code else {
            log!(Topic::Init, Info, "no referral pending");
            return Ok(());
        };

        core.promo_code.replace(code.clone());
        log!(Topic::Init, Info, "found promo code {code}; initializing");

        let body = EndpointOps::init_payload(&core.api_key(), &code, Platform::current());
        let request = HttpOps::put_json(
            core.url(INIT_PATH),
            &body,
            core.referral().max_response_bytes,
            "init",
        );
        let fetcher = Rc::clone(&core.services.fetcher);
        drop(core);

        let response = HttpOps::fetch_ok(&*fetcher, request)
            .await
            .at(ErrorOrigin::Init)?;

        let Some(core) = Core::live(weak) else {
            return Ok(());
        };
        let reply = InitResponse::parse(&response.body).at(ErrorOrigin::Init)?;

        if let Some(url) = &reply.offer_page_url {
            match core.services.launcher.open_foreground(url) {
                Ok(()) => log!(Topic::Init, Info, "opened offer page {url}"),
                Err(err) => log!(Topic::Init, Warn, "failed to open offer page {url}: {err}"),
            }
        }

        core.store()
            .complete_init(&reply.download_id, &reply.referral_code, reply.headers)
            .at(ErrorOrigin::Store)?;
        log!(
            Topic::Init,
            Ok,
            "referral initialized (download id {})",
            reply.download_id
        );
        drop(core);

        match PromoFileOps::delete(promo_file).await {
            Ok(()) => log!(Topic::PromoFile, Debug, "promo code file removed"),
            Err(err) => log!(Topic::PromoFile, Warn, "failed to remove promo code file: {err}"),
        }

        Ok(())
    }
}

///
/// TESTS
///
