use std::future::Future;

use serde::de::DeserializeOwned;
use signlink_core::wire::{
    ErrorResponse, FinalizeRequest, FinalizeResponse, StoreRequest, StoreResponse,
};

use crate::error::ServiceError;

/// The two server operations the coordinator calls.
pub trait SignatureService: Send + Sync {
    fn store(
        &self,
        req: &StoreRequest,
    ) -> impl Future<Output = Result<StoreResponse, ServiceError>> + Send;

    fn finalize(
        &self,
        req: &FinalizeRequest,
    ) -> impl Future<Output = Result<FinalizeResponse, ServiceError>> + Send;
}

/// `SignatureService` over HTTP against `signlink serve`.
#[derive(Debug, Clone)]
pub struct HttpSignatureService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSignatureService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, ServiceError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ServiceError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.endpoint(segments)?)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }
        let message = serde_json::from_slice::<ErrorResponse>(&bytes)
            .map(|e| e.message)
            .unwrap_or_default();
        Err(ServiceError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl SignatureService for HttpSignatureService {
    async fn store(&self, req: &StoreRequest) -> Result<StoreResponse, ServiceError> {
        self.post(&["api", "signatures"], req).await
    }

    async fn finalize(&self, req: &FinalizeRequest) -> Result<FinalizeResponse, ServiceError> {
        self.post(&["api", "signatures", "finalize"], req).await
    }
}
