use promo_core::{
    interface::{FetchError, PrefStore},
    log::{Level, LogBuffer},
    ops::endpoint::HEADERS_PATH,
    storage::keys,
};
use promo_testkit::{Harness, local};
use serde_json::json;
use std::time::Duration;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn initialized() -> Harness {
    let h = Harness::new();
    h.store.set_string(keys::DOWNLOAD_ID, "abc").unwrap();
    h.store
        .set_list(keys::HEADERS, vec![json!({"old": true})])
        .unwrap();

    h
}

#[tokio::test]
async fn array_replaces_headers() {
    local(async {
        let h = initialized();
        h.fetcher
            .reply_json(HEADERS_PATH, &json!([{"a": 1}, {"b": 2}]));

        let manager = h.manager();
        manager.start().unwrap();
        manager.settle().await;

        assert_eq!(manager.headers(), vec![json!({"a": 1}), json!({"b": 2})]);

        let request = &h.fetcher.requests_to(HEADERS_PATH)[0];
        assert!(request.body.is_none());
        assert!(!request.load_flags.send_auth);
    })
    .await;
}

#[tokio::test]
async fn object_payload_leaves_headers_and_logs() {
    local(async {
        let h = initialized();
        h.fetcher.reply_json(HEADERS_PATH, &json!({"a": 1}));

        let manager = h.manager();
        manager.start().unwrap();
        manager.settle().await;

        assert_eq!(manager.headers(), vec![json!({"old": true})]);
        assert!(LogBuffer::contains(
            Level::Error,
            "failed to fetch headers from referral server"
        ));
    })
    .await;
}

#[tokio::test]
async fn transport_and_status_failures_leave_headers() {
    local(async {
        let h = initialized();
        h.fetcher.fail(HEADERS_PATH, FetchError::Timeout);
        h.fetcher.reply(HEADERS_PATH, 503, "[]");

        let manager = h.manager();
        manager.start().unwrap();
        manager.settle().await;
        assert!(manager.fetch_referral_headers());
        manager.settle().await;

        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 2);
        assert_eq!(manager.headers(), vec![json!({"old": true})]);

        let metrics = manager.http_metrics();
        let entry = metrics.iter().find(|e| e.label == "headers").unwrap();
        assert_eq!(entry.requests, entry.failures);
    })
    .await;
}

#[tokio::test]
async fn one_refresh_in_flight_at_a_time() {
    local(async {
        let h = initialized();
        h.fetcher.reply_json(HEADERS_PATH, &json!([]));
        h.fetcher.hold();

        let manager = h.manager();
        assert!(manager.fetch_referral_headers());
        assert!(!manager.fetch_referral_headers());

        h.fetcher.release();
        manager.settle().await;

        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 1);
        assert!(manager.fetch_referral_headers());
        manager.settle().await;
        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 2);
    })
    .await;
}

#[tokio::test]
async fn completion_after_stop_is_dropped() {
    local(async {
        let h = initialized();
        h.fetcher.reply_json(HEADERS_PATH, &json!([{"new": true}]));
        h.fetcher.hold();

        let manager = h.manager();
        manager.start().unwrap();
        while h.fetcher.requests().is_empty() {
            tokio::task::yield_now().await;
        }
        manager.stop();

        h.fetcher.release();
        manager.settle().await;

        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 1);
        assert_eq!(manager.headers(), vec![json!({"old": true})]);
        assert!(!manager.fetch_referral_headers());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn refresh_repeats_daily() {
    local(async {
        let h = initialized();
        h.fetcher.reply_json(HEADERS_PATH, &json!([]));

        let manager = h.manager();
        manager.start().unwrap();
        manager.settle().await;
        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 1);

        tokio::time::sleep(DAY - Duration::from_secs(1)).await;
        manager.settle().await;
        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        manager.settle().await;
        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 2);

        tokio::time::sleep(DAY).await;
        manager.settle().await;
        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 3);

        manager.stop();
        tokio::time::sleep(DAY * 3).await;
        manager.settle().await;
        assert_eq!(h.fetcher.requests_to(HEADERS_PATH).len(), 3);
    })
    .await;
}
