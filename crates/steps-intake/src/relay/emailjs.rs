use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use super::{DispatchError, DispatchReceipt, EmailParameters, EmailSender};
use crate::config::EmailRelayConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// EmailJS-compatible REST relay.
#[derive(Debug, Clone)]
pub struct EmailJsClient {
    http: Client,
    endpoint: Url,
    service_id: String,
    public_key: String,
    private_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a EmailParameters,
}

impl EmailJsClient {
    pub fn new(
        endpoint: &str,
        service_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: Option<String>,
    ) -> Result<Self, DispatchError> {
        let endpoint = Url::parse(endpoint).map_err(|err| DispatchError::InvalidIdentifier {
            message: format!("invalid relay endpoint '{endpoint}': {err}"),
        })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| DispatchError::Network {
                message: err.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint,
            service_id: service_id.into(),
            public_key: public_key.into(),
            private_key,
        })
    }

    pub fn from_config(config: &EmailRelayConfig) -> Result<Self, DispatchError> {
        Self::new(
            &config.endpoint,
            config.service_id.clone(),
            config.public_key.clone(),
            config.private_key.clone(),
        )
    }

    fn check_identifiers(&self, template_id: &str) -> Result<(), DispatchError> {
        let missing: Vec<&str> = [
            ("service id", self.service_id.as_str()),
            ("template id", template_id),
            ("public key", self.public_key.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::InvalidIdentifier {
                message: format!("missing email relay {}", missing.join(", ")),
            })
        }
    }
}

#[async_trait]
impl EmailSender for EmailJsClient {
    async fn send(
        &self,
        template_id: &str,
        params: EmailParameters,
    ) -> Result<DispatchReceipt, DispatchError> {
        self.check_identifiers(template_id)?;

        let request = SendRequest {
            service_id: &self.service_id,
            template_id,
            user_id: &self.public_key,
            access_token: self.private_key.as_deref(),
            template_params: &params,
        };

        tracing::debug!(
            template_id,
            parameters = params.len(),
            "dispatching templated email"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| DispatchError::Network {
                message: err.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status.is_success() {
            tracing::info!(template_id, status = status.as_u16(), "email relay accepted message");
            return Ok(DispatchReceipt {
                status: status.as_u16(),
                text,
            });
        }

        Err(classify_status(status, text))
    }
}

pub(crate) fn classify_status(status: StatusCode, text: String) -> DispatchError {
    let message = if text.trim().is_empty() {
        status.to_string()
    } else {
        text
    };
    match status {
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            DispatchError::InvalidIdentifier { message }
        }
        StatusCode::TOO_MANY_REQUESTS => DispatchError::Throttled { message },
        _ => DispatchError::Rejected {
            status: status.as_u16(),
            text: message,
        },
    }
}
