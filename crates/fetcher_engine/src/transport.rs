use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use fetcher_core::{
    AttemptId, RawResponse, RequestEncoding, SubmissionRequest, TransferProgress,
    CREDENTIAL_FIELD, URL_FIELD,
};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};

use crate::{EngineEvent, FailureKind, TransportError};

/// Route of the extraction backend when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/download";

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Bound on the whole exchange, body included.
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            max_response_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, attempt: AttemptId, progress: TransferProgress);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, attempt: AttemptId, progress: TransferProgress) {
        let _ = self.tx.send(EngineEvent::Progress { attempt, progress });
    }
}

/// Sends a submission and returns whatever response came back.
///
/// Error statuses are not failures here: any received response is returned
/// so the classifier can look at it.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        attempt: AttemptId,
        request: &SubmissionRequest,
        sink: &dyn ProgressSink,
    ) -> Result<RawResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::InvalidRequest, err.to_string()))
    }

    fn too_large(&self, actual: u64) -> TransportError {
        TransportError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_response_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        attempt: AttemptId,
        request: &SubmissionRequest,
        sink: &dyn ProgressSink,
    ) -> Result<RawResponse, TransportError> {
        let endpoint = reqwest::Url::parse(&self.settings.endpoint)
            .map_err(|err| TransportError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        let client = self.build_client()?;

        engine_info!(
            "attempt={} POST {} encoding={:?} credential={:?}",
            attempt,
            endpoint,
            request.encoding(),
            request.credential()
        );

        let builder = client.post(endpoint);
        let builder = match request.encoding() {
            RequestEncoding::Multipart => builder.multipart(multipart_form(request)?),
            RequestEncoding::UrlEncoded => {
                builder.form(&[(URL_FIELD, request.source_url().as_str())])
            }
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let total = response.content_length();
        engine_debug!(
            "attempt={} status={} content_type={:?} content_length={:?}",
            attempt,
            status,
            headers.get("content-type"),
            total
        );

        // Error bodies are only read for their message; a short or cut-off one
        // still goes to the classifier.
        let is_media = (200..300).contains(&status);
        if let Some(len) = total {
            if is_media && len > self.settings.max_response_bytes {
                return Err(self.too_large(len));
            }
        }

        sink.emit(attempt, TransferProgress { loaded: 0, total });

        let capacity = total
            .unwrap_or(0)
            .min(self.settings.max_response_bytes)
            .min(64 * 1024 * 1024);
        let mut body = Vec::with_capacity(capacity as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) if !is_media => {
                    engine_warn!("attempt={} error body cut short: {}", attempt, err);
                    break;
                }
                Err(err) => return Err(map_reqwest_error(err)),
            };
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_response_bytes {
                if !is_media {
                    engine_warn!("attempt={} error body truncated at {} bytes", attempt, body.len());
                    break;
                }
                return Err(self.too_large(next_len));
            }
            body.extend_from_slice(&chunk);
            sink.emit(
                attempt,
                TransferProgress {
                    loaded: next_len,
                    total,
                },
            );
        }

        engine_info!("attempt={} received {} bytes (status {})", attempt, body.len(), status);

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn multipart_form(request: &SubmissionRequest) -> Result<Form, TransportError> {
    let form = Form::new().text(URL_FIELD, request.source_url().to_string());
    let Some(credential) = request.credential() else {
        return Ok(form);
    };
    let part = Part::bytes(credential.contents.clone())
        .file_name(credential.file_name.clone())
        .mime_str("text/plain")
        .map_err(|err| TransportError::new(FailureKind::InvalidRequest, err.to_string()))?;
    Ok(form.part(CREDENTIAL_FIELD, part))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_connect() {
        return TransportError::new(FailureKind::Connect, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}
