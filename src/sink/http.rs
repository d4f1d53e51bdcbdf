use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::error::SinkError;

/// Accepts a formatted record document for delivery.
///
/// The accumulator side only depends on this contract; the retry loop
/// and failure log sit on top of it. The returned future must be `Send`
/// because deliveries run as spawned tasks.
pub trait RecordSubmitter {
    /// Submit one formatted document. Ok means the destination accepted it.
    fn submit(&self, body: &Value) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Human-readable destination, recorded in the failure log.
    fn destination(&self) -> &str;
}

/// HTTP delivery of formatted record documents via POST.
pub struct HttpRecordSink {
    client: Client,
    endpoint: String,
}

impl HttpRecordSink {
    pub fn new(endpoint: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self { client, endpoint }
    }
}

impl RecordSubmitter for HttpRecordSink {
    async fn submit(&self, body: &Value) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(SinkError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    fn destination(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn submit_posts_document() {
        let server = MockServer::start().await;
        let body = json!({"modelType": "SubmodelElementCollection", "idShort": "Record1-1"});
        Mock::given(method("POST"))
            .and(path("/records"))
            .and(body_json(&body))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = HttpRecordSink::new(format!("{}/records", server.uri()));
        sink.submit(&body).await.unwrap();
    }

    #[tokio::test]
    async fn submit_surfaces_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let sink = HttpRecordSink::new(server.uri());
        let err = sink.submit(&json!({})).await.unwrap_err();
        match err {
            SinkError::ApiError { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_surfaces_network_error() {
        // Nothing listens on this port.
        let sink = HttpRecordSink::new("http://127.0.0.1:1/records".into());
        let err = sink.submit(&json!({})).await.unwrap_err();
        assert!(matches!(err, SinkError::NetworkError(_)));
    }

    #[test]
    fn destination_reports_endpoint() {
        let sink = HttpRecordSink::new("http://example.invalid/records".into());
        assert_eq!(sink.destination(), "http://example.invalid/records");
    }
}
