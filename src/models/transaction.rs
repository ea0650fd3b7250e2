use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::models::pawapay::{ProviderPrediction, RequestSent};

/// Amount as typed into the dashboard form: either a JSON string or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    pub fn as_text(&self) -> String {
        match self {
            AmountInput::Text(s) => s.trim().to_string(),
            AmountInput::Number(n) => n.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, AmountInput::Text(s) if s.trim().is_empty())
    }

    /// Plain decimal rendering of the amount (`"15"`, `"2.5"`) if it is greater than zero
    pub fn to_positive_amount(&self) -> Option<String> {
        let text = self.as_text();
        let value = Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()?;

        (value > Decimal::ZERO).then(|| value.normalize().to_string())
    }
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        AmountInput::Text(s.to_string())
    }
}

/// Body of `POST /api/deposit` and `POST /api/payout`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub phone_number: Option<String>,
    pub amount: Option<AmountInput>,
}

/// Body of `POST /api/refund`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundSubmission {
    pub deposit_id: Option<String>,
    pub amount: Option<AmountInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletBalancesQuery {
    pub country: Option<String>,
}

/// Stage of the submission pipeline a result refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionStep {
    Validation,
    PredictProvider,
    ResolveCurrency,
    Deposit,
    Payout,
    Refund,
}

/// Result of a deposit, payout or refund submission.
///
/// Fields only appear once the pipeline got far enough to compute them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    pub step: SubmissionStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_provider: Option<ProviderPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_sent: Option<RequestSent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// `{success, data}` or `{success, error}` envelope used by every other endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<Value>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
