use async_trait::async_trait;
use promo_core::interface::{FetchError, FetchRequest, FetchResponse, HttpFetcher};
use serde_json::Value;
use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    rc::Rc,
};
use tokio::sync::Semaphore;

///
/// FakeFetcher
///
/// Replies are scripted per URL path and consumed in order; the last reply
/// for a path repeats once the queue is down to one. Unscripted paths fail
/// with a connect error.
///

#[derive(Debug, Default)]
pub struct FakeFetcher {
    replies: RefCell<HashMap<String, VecDeque<Result<FetchResponse, FetchError>>>>,
    requests: RefCell<Vec<FetchRequest>>,
    gate: RefCell<Option<Rc<Semaphore>>>,
}

impl FakeFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------
    // Scripting
    // -------------------------------------------------------------

    pub fn reply(&self, path: &str, status: u16, body: &str) {
        self.push(
            path,
            Ok(FetchResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    pub fn reply_json(&self, path: &str, body: &Value) {
        self.reply(path, 200, &body.to_string());
    }

    pub fn fail(&self, path: &str, err: FetchError) {
        self.push(path, Err(err));
    }

    /// Park every request until `release`.
    pub fn hold(&self) {
        self.gate.replace(Some(Rc::new(Semaphore::new(0))));
    }

    /// Let parked and future requests through.
    pub fn release(&self) {
        if let Some(gate) = self.gate.take() {
            gate.close();
        }
    }

    // -------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------

    #[must_use]
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<FetchRequest> {
        self.requests
            .borrow()
            .iter()
            .filter(|r| path_of(&r.url) == path)
            .cloned()
            .collect()
    }

    /// The JSON bodies sent to `path`, in order.
    #[must_use]
    pub fn bodies_to(&self, path: &str) -> Vec<Value> {
        self.requests_to(path)
            .iter()
            .filter_map(|r| r.body.as_deref())
            .filter_map(|b| serde_json::from_str(b).ok())
            .collect()
    }

    fn push(&self, path: &str, reply: Result<FetchResponse, FetchError>) {
        self.replies
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, path: &str) -> Result<FetchResponse, FetchError> {
        let mut replies = self.replies.borrow_mut();
        let Some(queue) = replies.get_mut(path) else {
            return Err(FetchError::Connect(format!("no reply scripted for {path}")));
        };

        if queue.len() > 1
            && let Some(reply) = queue.pop_front()
        {
            return reply;
        }

        queue
            .front()
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Connect(format!("no reply scripted for {path}"))))
    }
}

#[async_trait(?Send)]
impl HttpFetcher for FakeFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let path = path_of(&request.url).to_string();
        self.requests.borrow_mut().push(request);

        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            // closed means released
            let _ = gate.acquire().await;
        }

        self.next_reply(&path)
    }
}

/// Path component of `scheme://host/path`.
#[must_use]
pub fn path_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);

    rest.find('/').map_or("", |i| &rest[i..])
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_everything_after_the_host() {
        assert_eq!(path_of("https://h:1/promo/activity"), "/promo/activity");
        assert_eq!(path_of("https://h"), "");
    }

    #[test]
    fn replies_are_consumed_then_last_repeats() {
        let fetcher = FakeFetcher::new();
        fetcher.reply("/p", 500, "");
        fetcher.reply("/p", 200, "[]");

        assert_eq!(fetcher.next_reply("/p").unwrap().status, 500);
        assert_eq!(fetcher.next_reply("/p").unwrap().status, 200);
        assert_eq!(fetcher.next_reply("/p").unwrap().status, 200);
        assert!(fetcher.next_reply("/other").is_err());
    }
}
