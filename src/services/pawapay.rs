//! pawaPay API client
//!
//! Every upstream call goes through [`PaymentGateway`]. Failures come back as
//! [`GatewayError`] values and are never retried.

use async_trait::async_trait;
use reqwest::{header, Client, Response, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::pawapay::{
    ActiveConfiguration, DepositRequest, PayoutRequest, ProviderPrediction, RefundRequest,
};

pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.pawapay.io";

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Connection, TLS or body read failure
    #[error("{0}")]
    Transport(String),
    /// Non-2xx answer; `body` is the decoded error document when upstream sent one
    #[error("Request failed with status code {status}")]
    Upstream { status: u16, body: Option<Value> },
    /// 2xx answer whose body doesn't have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Error value surfaced to callers: upstream's body when present, otherwise the message
    pub fn to_payload(&self) -> Value {
        match self {
            GatewayError::Upstream {
                body: Some(body), ..
            } => body.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn predict_provider(&self, phone_number: &str) -> GatewayResult<ProviderPrediction>;
    async fn fetch_active_conf(&self) -> GatewayResult<ActiveConfiguration>;
    async fn initiate_deposit(&self, payload: &DepositRequest) -> GatewayResult<Value>;
    async fn initiate_payout(&self, payload: &PayoutRequest) -> GatewayResult<Value>;
    async fn initiate_refund(&self, payload: &RefundRequest) -> GatewayResult<Value>;
    async fn check_deposit_status(&self, deposit_id: &str) -> GatewayResult<Value>;
    async fn check_payout_status(&self, payout_id: &str) -> GatewayResult<Value>;
    async fn check_refund_status(&self, refund_id: &str) -> GatewayResult<Value>;
    async fn fetch_wallet_balances(&self, country: Option<&str>) -> GatewayResult<Value>;
}

#[derive(Clone)]
pub struct PawapayClient {
    client: Client,
    base_url: Url,
    api_token: String,
}

impl PawapayClient {
    pub fn new(base_url: Url, api_token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_token,
        }
    }

    /// Appends `segments` to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                GatewayError::Transport(format!("Invalid pawaPay base URL: {}", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> GatewayResult<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        decode_response(response).await
    }

    async fn post<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> GatewayResult<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
            .header(header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let status = response.status();
    let url = response.url().clone();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }))
        };
        tracing::warn!("pawaPay API error {} for {}", status, url);
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    let result = if bytes.is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(&bytes)
    };

    result.map_err(|e| {
        tracing::warn!("Could not decode pawaPay response from {}: {}", url, e);
        GatewayError::Decode(e.to_string())
    })
}

#[async_trait]
impl PaymentGateway for PawapayClient {
    async fn predict_provider(&self, phone_number: &str) -> GatewayResult<ProviderPrediction> {
        tracing::info!("Predicting provider for {}", phone_number);
        self.post(
            &["v2", "predict-provider"],
            &serde_json::json!({ "phoneNumber": phone_number }),
        )
        .await
    }

    async fn fetch_active_conf(&self) -> GatewayResult<ActiveConfiguration> {
        self.get(&["v2", "active-conf"], &[]).await
    }

    async fn initiate_deposit(&self, payload: &DepositRequest) -> GatewayResult<Value> {
        tracing::info!("Initiating deposit {}", payload.deposit_id);
        self.post(&["v2", "deposits"], payload).await
    }

    async fn initiate_payout(&self, payload: &PayoutRequest) -> GatewayResult<Value> {
        tracing::info!("Initiating payout {}", payload.payout_id);
        self.post(&["v2", "payouts"], payload).await
    }

    async fn initiate_refund(&self, payload: &RefundRequest) -> GatewayResult<Value> {
        tracing::info!(
            "Initiating refund {} of deposit {}",
            payload.refund_id,
            payload.deposit_id
        );
        self.post(&["v2", "refunds"], payload).await
    }

    async fn check_deposit_status(&self, deposit_id: &str) -> GatewayResult<Value> {
        self.get(&["v2", "deposits", deposit_id], &[]).await
    }

    async fn check_payout_status(&self, payout_id: &str) -> GatewayResult<Value> {
        self.get(&["v2", "payouts", payout_id], &[]).await
    }

    async fn check_refund_status(&self, refund_id: &str) -> GatewayResult<Value> {
        self.get(&["v2", "refunds", refund_id], &[]).await
    }

    async fn fetch_wallet_balances(&self, country: Option<&str>) -> GatewayResult<Value> {
        match country {
            Some(country) => {
                self.get(&["v2", "wallet-balances"], &[("country", country)])
                    .await
            }
            None => self.get(&["v2", "wallet-balances"], &[]).await,
        }
    }
}
