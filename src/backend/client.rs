use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;

#[cfg(test)]
use mockall::automock;

use super::errors::BackendError;
use super::types::{
    GenerateInvoiceRequest, GenerateInvoiceResponse, GeneratedInvoice, SubscriptionAction,
    TransitionBody, TransitionResponse,
};
use crate::config::BackendConfig;
use crate::http::RateLimitedHttpClient;

/// Trait for the backend calls the approval workflow depends on
///
/// `transition` is not assumed idempotent and is never retried by callers.
/// `generate_document` may be called several times for one logical request.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Apply a state transition to a subscription
    async fn transition(
        &self,
        id: &str,
        action: SubscriptionAction,
    ) -> Result<TransitionResponse, BackendError>;

    /// Generate the invoice document for an approved subscription
    async fn generate_document(
        &self,
        request: &GenerateInvoiceRequest,
    ) -> Result<GeneratedInvoice, BackendError>;
}

/// REST implementation over [`RateLimitedHttpClient`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: RateLimitedHttpClient,
}

impl HttpBackend {
    pub fn new(http: RateLimitedHttpClient) -> Self {
        Self { http }
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self::new(RateLimitedHttpClient::new(config)?))
    }
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn transition(
        &self,
        id: &str,
        action: SubscriptionAction,
    ) -> Result<TransitionResponse, BackendError> {
        let body = self
            .http
            .send_json(
                Method::PATCH,
                &["subscriptions", id, "action"],
                &TransitionBody { action },
            )
            .await?;

        // 204-style empty replies carry no project
        let response: TransitionResponse = if body.trim().is_empty() {
            TransitionResponse::default()
        } else {
            parse_json(&body)?
        };

        if response.success == Some(false) {
            return Err(BackendError::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| format!("{action} was not applied")),
            });
        }

        Ok(response)
    }

    async fn generate_document(
        &self,
        request: &GenerateInvoiceRequest,
    ) -> Result<GeneratedInvoice, BackendError> {
        let body = self
            .http
            .send_json(Method::POST, &["invoices", "generate"], request)
            .await?;
        let response: GenerateInvoiceResponse = parse_json(&body)?;

        if response.success == Some(false) {
            return Err(BackendError::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| "invoice generation was refused".to_string()),
            });
        }

        match response.reference_number {
            Some(reference_number) if !reference_number.trim().is_empty() => {
                Ok(GeneratedInvoice { reference_number })
            }
            _ => Err(BackendError::MalformedResponse {
                message: "response has no referenceNumber".to_string(),
            }),
        }
    }
}
