use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::mpsc;

use super::{BlobUploader, ObjectKey, StorageError, StoredObject, UploadProgress};
use crate::config::StorageConfig;
use crate::workflows::cv_submission::domain::AttachedFile;

const CHUNK_SIZE: usize = 64 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Uploads CVs through the Firebase Storage REST API.
#[derive(Debug, Clone)]
pub struct FirebaseStorageClient {
    http: Client,
    endpoint: Url,
    bucket: String,
    auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    name: String,
    #[serde(rename = "downloadTokens", default)]
    download_tokens: Option<String>,
}

impl FirebaseStorageClient {
    pub fn new(
        endpoint: &str,
        bucket: impl Into<String>,
        auth_token: Option<String>,
    ) -> Result<Self, StorageError> {
        let endpoint = Url::parse(endpoint).map_err(|err| StorageError::Transport {
            status: None,
            message: format!("invalid storage endpoint '{endpoint}': {err}"),
        })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| StorageError::Transport {
                status: None,
                message: err.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint,
            bucket: bucket.into(),
            auth_token,
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::new(&config.endpoint, config.bucket.clone(), config.auth_token.clone())
    }

    fn object_collection_url(&self) -> Result<Url, StorageError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| StorageError::Transport {
                status: None,
                message: format!("storage endpoint '{}' cannot hold a path", self.endpoint),
            })?
            .pop_if_empty()
            .extend(["v0", "b", self.bucket.as_str(), "o"]);
        Ok(url)
    }

    pub(crate) fn upload_url(&self, key: &ObjectKey) -> Result<Url, StorageError> {
        let mut url = self.object_collection_url()?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", key.as_str());
        Ok(url)
    }

    /// Public media link; the object name is a single percent-encoded path segment.
    pub(crate) fn download_url(
        &self,
        object_name: &str,
        token: Option<&str>,
    ) -> Result<Url, StorageError> {
        let mut url = self.object_collection_url()?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(object_name);
        }
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("alt", "media");
            if let Some(token) = token {
                query.append_pair("token", token);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl BlobUploader for FirebaseStorageClient {
    async fn upload(
        &self,
        file: &AttachedFile,
        key: &ObjectKey,
        progress: &dyn UploadProgress,
    ) -> Result<StoredObject, StorageError> {
        let url = self.upload_url(key)?;
        let total = file.size();
        tracing::debug!(%key, bytes = total, bucket = %self.bucket, "starting storage upload");

        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let mut sent = 0usize;
        let chunks = chunk_bytes(&file.bytes);
        let body = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len();
            let _ = tx.send(percent_of(sent, total));
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, file.content_type.as_str())
            .header(CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(body));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        progress.report(0);
        let send = request.send();
        tokio::pin!(send);
        let outcome = loop {
            tokio::select! {
                result = &mut send => break result,
                Some(percent) = rx.recv() => progress.report(percent),
            }
        };
        while let Ok(percent) = rx.try_recv() {
            progress.report(percent);
        }

        let response = outcome.map_err(classify_transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let payload: UploadResponse =
            response
                .json()
                .await
                .map_err(|err| StorageError::Transport {
                    status: Some(status.as_u16()),
                    message: format!("unexpected upload response: {err}"),
                })?;

        let token = payload
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty());
        let url = self.download_url(&payload.name, token)?;
        progress.report(100);

        tracing::info!(%key, "storage upload confirmed");
        Ok(StoredObject {
            key: key.clone(),
            url: url.to_string(),
        })
    }
}

fn chunk_bytes(bytes: &Bytes) -> Vec<Bytes> {
    if bytes.is_empty() {
        return vec![Bytes::new()];
    }
    (0..bytes.len())
        .step_by(CHUNK_SIZE)
        .map(|start| bytes.slice(start..(start + CHUNK_SIZE).min(bytes.len())))
        .collect()
}

fn percent_of(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) as u128 * 100) / total as u128) as u8
}

fn classify_transport(err: reqwest::Error) -> StorageError {
    if err.is_timeout() {
        StorageError::TimedOut {
            after: REQUEST_TIMEOUT,
        }
    } else if err.is_connect() || err.is_request() {
        StorageError::NetworkRejected {
            reason: err.to_string(),
        }
    } else {
        StorageError::Transport {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}

pub(crate) fn classify_status(status: StatusCode, body: String) -> StorageError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized {
            status: status.as_u16(),
        },
        _ => StorageError::Transport {
            status: Some(status.as_u16()),
            message: if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            },
        },
    }
}
