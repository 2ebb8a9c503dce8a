use crate::interface::HttpMethod;
use std::{cell::RefCell, collections::HashMap};

thread_local! {
    static HTTP_METRICS: RefCell<HashMap<HttpMetricKey, HttpMetricCounts>> = RefCell::new(HashMap::new());
}

///
/// HttpMetricKey
/// Identifies a referral request by method + label.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HttpMetricKey {
    pub method: HttpMethod,
    pub label: String,
}

///
/// HttpMetricCounts
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HttpMetricCounts {
    pub requests: u64,
    pub failures: u64,
}

///
/// HttpMetricEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpMetricEntry {
    pub method: HttpMethod,
    pub label: String,
    pub requests: u64,
    pub failures: u64,
}

pub type HttpMetricsSnapshot = Vec<HttpMetricEntry>;

///
/// HttpMetrics
/// Volatile per-thread counters for outbound referral requests.
///

pub struct HttpMetrics;

impl HttpMetrics {
    pub fn record_request(method: HttpMethod, label: &str) {
        Self::update(method, label, |c| c.requests = c.requests.saturating_add(1));
    }

    /// Transport failures and non-200 statuses.
    pub fn record_failure(method: HttpMethod, label: &str) {
        Self::update(method, label, |c| c.failures = c.failures.saturating_add(1));
    }

    /// Entries sorted by label, then method.
    #[must_use]
    pub fn snapshot() -> HttpMetricsSnapshot {
        let mut entries: Vec<_> = HTTP_METRICS.with_borrow(|counts| {
            counts
                .iter()
                .map(|(key, c)| HttpMetricEntry {
                    method: key.method,
                    label: key.label.clone(),
                    requests: c.requests,
                    failures: c.failures,
                })
                .collect()
        });
        entries.sort_by(|a, b| {
            (a.label.as_str(), a.method.to_string()).cmp(&(b.label.as_str(), b.method.to_string()))
        });

        entries
    }

    pub fn reset() {
        HTTP_METRICS.with_borrow_mut(HashMap::clear);
    }

    fn update(method: HttpMethod, label: &str, f: impl FnOnce(&mut HttpMetricCounts)) {
        HTTP_METRICS.with_borrow_mut(|counts| {
            let key = HttpMetricKey {
                method,
                label: label.to_string(),
            };
            f(counts.entry(key).or_default());
        });
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_method_and_label() {
        HttpMetrics::reset();

        HttpMetrics::record_request(HttpMethod::Get, "headers");
        HttpMetrics::record_request(HttpMethod::Get, "headers");
        HttpMetrics::record_failure(HttpMethod::Get, "headers");
        HttpMetrics::record_request(HttpMethod::Put, "activity");

        let snapshot = HttpMetrics::snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].label, "activity");
        assert_eq!(snapshot[0].requests, 1);
        assert_eq!(snapshot[1].label, "headers");
        assert_eq!((snapshot[1].requests, snapshot[1].failures), (2, 1));
    }
}
