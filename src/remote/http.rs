use async_trait::async_trait;
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::io::StreamReader;
use tracing::debug;

use super::{FetchError, FetchMetrics, RemoteBody, RemoteSource};
use crate::config::DocsConfig;
use crate::error::Result;

const USER_AGENT: &str = concat!("docjar/", env!("CARGO_PKG_VERSION"));

/// Mirror access over HTTP(S)
///
/// Every request is bounded: metadata requests by `metadata_timeout`,
/// archive downloads (body included) by `download_timeout`. A timeout is
/// reported like any other transport failure so the caller moves on to the
/// next mirror.
pub struct HttpSource {
    client: reqwest::Client,
    metadata_timeout: Duration,
    download_timeout: Duration,
    metrics: Arc<FetchMetrics>,
}

impl HttpSource {
    pub fn new(config: &DocsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(HttpSource {
            client,
            metadata_timeout: config.metadata_timeout,
            download_timeout: config.download_timeout,
            metrics: FetchMetrics::new(),
        })
    }

    pub fn metrics(&self) -> &Arc<FetchMetrics> {
        &self.metrics
    }

    async fn get(&self, url: &str, timeout: Duration) -> std::result::Result<reqwest::Response, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let started = Instant::now();
        let result = self.client.get(parsed).timeout(timeout).send().await;
        let elapsed = started.elapsed();

        match result {
            Ok(response) if response.status().is_success() => {
                self.metrics.record_request(elapsed, true);
                debug!(url, status = response.status().as_u16(), ?elapsed, "mirror responded");
                Ok(response)
            }
            Ok(response) => {
                self.metrics.record_request(elapsed, false);
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                })
            }
            Err(err) => {
                self.metrics.record_request(elapsed, false);
                Err(classify(url, err))
            }
        }
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self.get(url, self.metadata_timeout).await?;
        let text = response.text().await.map_err(|e| classify(url, e))?;
        self.metrics.record_bytes(text.len() as u64);
        Ok(text)
    }

    async fn open(&self, url: &str) -> std::result::Result<RemoteBody, FetchError> {
        let response = self.get(url, self.download_timeout).await?;
        let content_length = response.content_length();

        let metrics = Arc::clone(&self.metrics);
        let stream = response
            .bytes_stream()
            .inspect_ok(move |chunk| metrics.record_bytes(chunk.len() as u64))
            .map_err(std::io::Error::other);

        Ok(RemoteBody {
            content_length,
            reader: Box::pin(StreamReader::new(stream)),
        })
    }
}

fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tokio::io::AsyncReadExt;

    fn source() -> HttpSource {
        HttpSource::new(&DocsConfig::new("unused")).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_text_success_records_metrics() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/g/a/maven-metadata.xml");
                then.status(200).body("<metadata/>");
            })
            .await;

        let source = source();
        let text = source
            .fetch_text(&server.url("/g/a/maven-metadata.xml"))
            .await
            .unwrap();

        assert_eq!(text, "<metadata/>");
        assert_eq!(source.metrics().request_count(), 1);
        assert_eq!(source.metrics().total_bytes(), 11);
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404);
            })
            .await;

        let source = source();
        let err = source.fetch_text(&server.url("/missing")).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(source.metrics().failure_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_without_a_request() {
        let source = source();
        let err = source.open("not a url").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert_eq!(source.metrics().request_count(), 0);
    }

    #[tokio::test]
    async fn test_metadata_timeout_is_reported_as_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_secs(5)).body("late");
            })
            .await;

        let config = DocsConfig::new("unused").with_timeouts(
            Duration::from_secs(1),
            Duration::from_millis(200),
            Duration::from_millis(200),
        );
        let source = HttpSource::new(&config).unwrap();
        let err = source.fetch_text(&server.url("/slow")).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_open_streams_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/archive.jar");
                then.status(200).body(vec![7u8; 4096]);
            })
            .await;

        let source = source();
        let mut body = source.open(&server.url("/archive.jar")).await.unwrap();
        assert_eq!(body.content_length, Some(4096));

        let mut bytes = Vec::new();
        body.reader.read_to_end(&mut bytes).await.unwrap();
        assert_eq!(bytes.len(), 4096);
        assert_eq!(source.metrics().total_bytes(), 4096);
    }

    #[test]
    fn test_client_build_failure_is_a_transport_error() {
        let reqwest_err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err: crate::error::DocsError = FetchError::Client(reqwest_err).into();

        assert!(matches!(err, crate::error::DocsError::Transport(FetchError::Client(_))));
        assert!(err.to_string().starts_with("failed to build HTTP client"));
    }
}
