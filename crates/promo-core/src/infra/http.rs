use crate::{
    interface::{FetchError, FetchRequest, FetchResponse, HttpFetcher, HttpMethod},
    log,
    log::Topic,
};
use async_trait::async_trait;
use reqwest::{
    Client,
    header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue, PRAGMA},
};
use std::time::Duration;

///
/// ReqwestFetcher
///
/// `reqwest` without a cookie store, credential helpers or environment
/// proxies, so every request is anonymous whatever its cookie and auth flags
/// say. Cache bypass is sent explicitly when the flags ask for it.
///

#[derive(Clone, Debug)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| FetchError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    async fn read_capped(
        mut response: reqwest::Response,
        limit: usize,
    ) -> Result<Vec<u8>, FetchError> {
        let declared_limit = u64::try_from(limit).unwrap_or(u64::MAX);
        if response.content_length().is_some_and(|len| len > declared_limit) {
            return Err(FetchError::ResponseTooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_error)? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::ResponseTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait(?Send)]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
        };

        if !request.load_flags.use_cache {
            builder = builder
                .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
                .header(PRAGMA, HeaderValue::from_static("no-cache"));
        }
        if let Some(body) = request.body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }

        log!(
            Topic::Http,
            Debug,
            "{} {} ({})",
            request.method,
            request.url,
            request.label
        );

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let body = Self::read_capped(response, request.max_response_bytes).await?;

        Ok(FetchResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

fn map_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_connect() {
        FetchError::Connect(err.to_string())
    } else if err.is_body() || err.is_decode() {
        FetchError::Body(err.to_string())
    } else {
        FetchError::Other(err.to_string())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::LoadFlags;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    const LIMIT: usize = 1024 * 1024;

    // answers one connection with `response` and yields the request head
    async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/promo/headers", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            // the client may hang up early on oversized bodies
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&head).to_lowercase()
        });

        (url, server)
    }

    fn request(url: String, load_flags: LoadFlags) -> FetchRequest {
        FetchRequest {
            method: HttpMethod::Get,
            url,
            body: None,
            load_flags,
            max_response_bytes: LIMIT,
            label: "headers",
        }
    }

    fn fetcher() -> ReqwestFetcher {
        ReqwestFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn anonymous_request_bypasses_caches() {
        let (url, server) =
            serve_once(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]".to_vec())
                .await;

        let response = fetcher()
            .fetch(request(url, LoadFlags::anonymous()))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "[]");

        let head = server.await.unwrap();
        assert!(head.starts_with("get /promo/headers "));
        assert!(head.contains("cache-control: no-cache\r\n"));
        assert!(head.contains("pragma: no-cache\r\n"));
        assert!(!head.contains("cookie:"));
        assert!(!head.contains("authorization:"));
    }

    #[tokio::test]
    async fn cacheable_request_sends_no_cache_headers() {
        let (url, server) =
            serve_once(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}".to_vec())
                .await;

        let flags = LoadFlags {
            use_cache: true,
            ..LoadFlags::anonymous()
        };
        fetcher().fetch(request(url, flags)).await.unwrap();

        let head = server.await.unwrap();
        assert!(!head.contains("cache-control:"));
        assert!(!head.contains("pragma:"));
    }

    #[tokio::test]
    async fn non_success_status_is_still_a_response() {
        let (url, _server) = serve_once(
            b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 4\r\nconnection: close\r\n\r\nbusy"
                .to_vec(),
        )
        .await;

        let response = fetcher()
            .fetch(request(url, LoadFlags::anonymous()))
            .await
            .unwrap();
        assert_eq!(response.status, 503);
        assert_eq!(response.body, "busy");
    }

    #[tokio::test]
    async fn declared_length_over_the_cap_is_rejected() {
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            LIMIT + 1
        );
        let (url, _server) = serve_once(head.into_bytes()).await;

        let err = fetcher()
            .fetch(request(url, LoadFlags::anonymous()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::ResponseTooLarge { limit: LIMIT });
    }

    #[tokio::test]
    async fn streamed_body_over_the_cap_is_rejected() {
        let mut response =
            b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n".to_vec();
        let chunk = vec![b'x'; 64 * 1024];
        for _ in 0..(2 * LIMIT / chunk.len()) {
            response.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
            response.extend_from_slice(&chunk);
            response.extend_from_slice(b"\r\n");
        }
        response.extend_from_slice(b"0\r\n\r\n");
        let (url, _server) = serve_once(response).await;

        let err = fetcher()
            .fetch(request(url, LoadFlags::anonymous()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::ResponseTooLarge { limit: LIMIT });
    }

    #[tokio::test]
    async fn refused_connection_maps_to_connect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/promo/headers", listener.local_addr().unwrap());
        drop(listener);

        let err = fetcher()
            .fetch(request(url, LoadFlags::anonymous()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Connect(_)));
    }
}
