//! Deposit, payout and refund submission pipeline
//!
//! A deposit or payout runs validation, provider prediction, currency
//! resolution, upstream submission and logging in order. The first failing
//! step ends the run and is reported together with whatever was computed
//! before it. Nothing is logged unless upstream accepted the request.

use sea_orm::DbErr;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::transactions::{self, TransactionType};
use crate::models::pawapay::{
    ActiveConfiguration, DepositRequest, MobileMoneyAccount, OperationType, PayoutRequest,
    ProviderPrediction, RefundRequest, RequestSent,
};
use crate::models::transaction::{
    RefundSubmission, SubmissionResponse, SubmissionStep, TransactionRequest,
};
use crate::services::pawapay::{GatewayError, GatewayResult, PaymentGateway};
use crate::services::transaction_log::{NewTransaction, TransactionLog};

/// Status recorded when upstream's answer has none
pub const UNKNOWN_STATUS: &str = "UNKNOWN";
/// Amount recorded for a refund of the whole deposit
pub const FULL_REFUND_AMOUNT: &str = "FULL";

/// Money movements that go through provider prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    Deposit,
    Payout,
}

impl TransferKind {
    pub fn operation_type(&self) -> OperationType {
        match self {
            TransferKind::Deposit => OperationType::Deposit,
            TransferKind::Payout => OperationType::Payout,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransferKind::Deposit => TransactionType::Deposit,
            TransferKind::Payout => TransactionType::Payout,
        }
    }

    pub fn step(&self) -> SubmissionStep {
        match self {
            TransferKind::Deposit => SubmissionStep::Deposit,
            TransferKind::Payout => SubmissionStep::Payout,
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Upstream(#[from] GatewayError),
    #[error("No {operation} currency found for provider {provider}")]
    Resolution {
        provider: String,
        operation: OperationType,
    },
    #[error("Failed to record transaction: {0}")]
    Persistence(#[from] DbErr),
}

impl SubmissionError {
    pub fn to_payload(&self) -> Value {
        match self {
            SubmissionError::Upstream(e) => e.to_payload(),
            other => Value::String(other.to_string()),
        }
    }
}

/// Partial results accumulated while the pipeline runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionContext {
    pub predicted_provider: Option<ProviderPrediction>,
    pub resolved_currency: Option<String>,
    pub request_sent: Option<RequestSent>,
    /// Upstream's answer once it accepted the request
    pub response: Option<Value>,
}

#[derive(Debug)]
pub struct SubmissionFailure {
    pub step: SubmissionStep,
    pub context: SubmissionContext,
    pub error: SubmissionError,
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub step: SubmissionStep,
    pub context: SubmissionContext,
    pub response: Value,
    pub record: transactions::Model,
}

impl From<SubmissionReceipt> for SubmissionResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        SubmissionResponse {
            success: true,
            step: receipt.step,
            predicted_provider: receipt.context.predicted_provider,
            resolved_currency: receipt.context.resolved_currency,
            request_sent: receipt.context.request_sent,
            response: Some(receipt.response),
            error: None,
        }
    }
}

impl From<SubmissionFailure> for SubmissionResponse {
    fn from(failure: SubmissionFailure) -> Self {
        SubmissionResponse {
            success: false,
            step: failure.step,
            error: Some(failure.error.to_payload()),
            predicted_provider: failure.context.predicted_provider,
            resolved_currency: failure.context.resolved_currency,
            request_sent: failure.context.request_sent,
            response: failure.context.response,
        }
    }
}

type StepResult<T> = Result<T, (SubmissionStep, SubmissionError)>;

fn at<E: Into<SubmissionError>>(
    step: SubmissionStep,
) -> impl FnOnce(E) -> (SubmissionStep, SubmissionError) {
    move |e| (step, e.into())
}

/// Status reported in an upstream initiation or status answer
pub fn upstream_status(response: &Value) -> String {
    response
        .get("status")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_STATUS)
        .to_string()
}

#[derive(Clone)]
pub struct TransactionService {
    gateway: Arc<dyn PaymentGateway>,
    log: TransactionLog,
}

impl TransactionService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, log: TransactionLog) -> Self {
        Self { gateway, log }
    }

    pub async fn submit_transaction(
        &self,
        kind: TransferKind,
        request: &TransactionRequest,
    ) -> Result<SubmissionReceipt, SubmissionFailure> {
        let mut context = SubmissionContext::default();

        match self.run_transfer(kind, request, &mut context).await {
            Ok((response, record)) => Ok(SubmissionReceipt {
                step: kind.step(),
                context,
                response,
                record,
            }),
            Err((step, error)) => {
                tracing::warn!("{:?} submission failed at {:?}: {}", kind, step, error);
                Err(SubmissionFailure {
                    step,
                    context,
                    error,
                })
            }
        }
    }

    async fn run_transfer(
        &self,
        kind: TransferKind,
        request: &TransactionRequest,
        context: &mut SubmissionContext,
    ) -> StepResult<(Value, transactions::Model)> {
        let (phone_number, amount) =
            validate_transfer(request).map_err(at(SubmissionStep::Validation))?;

        let prediction = self
            .gateway
            .predict_provider(&phone_number)
            .await
            .map_err(at(SubmissionStep::PredictProvider))?;
        tracing::debug!(
            "Predicted provider {} ({:?}) for {}",
            prediction.provider,
            prediction.country,
            phone_number
        );
        context.predicted_provider = Some(prediction.clone());

        let conf = self
            .gateway
            .fetch_active_conf()
            .await
            .map_err(at(SubmissionStep::ResolveCurrency))?;
        let currency = resolve_currency(&conf, &prediction, kind.operation_type())
            .map_err(at(SubmissionStep::ResolveCurrency))?;
        tracing::debug!("Resolved currency {} for {}", currency, prediction.provider);
        context.resolved_currency = Some(currency.clone());

        let id = Uuid::new_v4().to_string();
        let account = MobileMoneyAccount::mmo(&prediction.phone_number, &prediction.provider);

        let result = match kind {
            TransferKind::Deposit => {
                let payload = DepositRequest {
                    deposit_id: id.clone(),
                    amount: amount.clone(),
                    currency: currency.clone(),
                    payer: account,
                };
                let result = self.gateway.initiate_deposit(&payload).await;
                context.request_sent = Some(RequestSent::Deposit(payload));
                result
            }
            TransferKind::Payout => {
                let payload = PayoutRequest {
                    payout_id: id.clone(),
                    amount: amount.clone(),
                    currency: currency.clone(),
                    recipient: account,
                };
                let result = self.gateway.initiate_payout(&payload).await;
                context.request_sent = Some(RequestSent::Payout(payload));
                result
            }
        };
        let response = result.map_err(at(kind.step()))?;
        context.response = Some(response.clone());

        let record = self
            .log
            .append(NewTransaction {
                transaction_type: kind.transaction_type(),
                identifier: id,
                refunded_deposit_id: None,
                amount,
                currency: Some(currency),
                phone_number: Some(prediction.phone_number),
                provider: Some(prediction.provider),
                country: prediction.country,
                status: upstream_status(&response),
            })
            .await
            .map_err(|e| {
                tracing::error!("Upstream accepted {:?} but logging failed: {}", kind, e);
                (kind.step(), SubmissionError::from(e))
            })?;

        Ok((response, record))
    }

    pub async fn submit_refund(
        &self,
        request: &RefundSubmission,
    ) -> Result<SubmissionReceipt, SubmissionFailure> {
        let mut context = SubmissionContext::default();

        match self.run_refund(request, &mut context).await {
            Ok((response, record)) => Ok(SubmissionReceipt {
                step: SubmissionStep::Refund,
                context,
                response,
                record,
            }),
            Err((step, error)) => {
                tracing::warn!("Refund submission failed at {:?}: {}", step, error);
                Err(SubmissionFailure {
                    step,
                    context,
                    error,
                })
            }
        }
    }

    async fn run_refund(
        &self,
        request: &RefundSubmission,
        context: &mut SubmissionContext,
    ) -> StepResult<(Value, transactions::Model)> {
        let (deposit_id, amount) =
            validate_refund(request).map_err(at(SubmissionStep::Validation))?;

        let payload = RefundRequest {
            refund_id: Uuid::new_v4().to_string(),
            deposit_id,
            amount,
        };
        let result = self.gateway.initiate_refund(&payload).await;
        context.request_sent = Some(RequestSent::Refund(payload.clone()));
        let response = result.map_err(at(SubmissionStep::Refund))?;
        context.response = Some(response.clone());

        let record = self
            .log
            .append(NewTransaction {
                transaction_type: TransactionType::Refund,
                identifier: payload.refund_id,
                refunded_deposit_id: Some(payload.deposit_id),
                amount: payload
                    .amount
                    .unwrap_or_else(|| FULL_REFUND_AMOUNT.to_string()),
                currency: None,
                phone_number: None,
                provider: None,
                country: None,
                status: upstream_status(&response),
            })
            .await
            .map_err(|e| {
                tracing::error!("Upstream accepted refund but logging failed: {}", e);
                (SubmissionStep::Refund, SubmissionError::from(e))
            })?;

        Ok((response, record))
    }

    pub async fn active_configuration(&self) -> GatewayResult<ActiveConfiguration> {
        self.gateway.fetch_active_conf().await
    }

    /// Live status straight from upstream; the log is not consulted or updated
    pub async fn check_status(&self, kind: TransactionType, id: &str) -> GatewayResult<Value> {
        match kind {
            TransactionType::Deposit => self.gateway.check_deposit_status(id).await,
            TransactionType::Payout => self.gateway.check_payout_status(id).await,
            TransactionType::Refund => self.gateway.check_refund_status(id).await,
        }
    }

    pub async fn wallet_balances(&self, country: Option<&str>) -> GatewayResult<Value> {
        self.gateway.fetch_wallet_balances(country).await
    }
}

fn resolve_currency(
    conf: &ActiveConfiguration,
    prediction: &ProviderPrediction,
    operation: OperationType,
) -> Result<String, SubmissionError> {
    conf.resolve_currency(prediction.country.as_deref(), &prediction.provider, operation)
        .map(str::to_string)
        .ok_or_else(|| SubmissionError::Resolution {
            provider: prediction.provider.clone(),
            operation,
        })
}

fn validate_transfer(request: &TransactionRequest) -> Result<(String, String), SubmissionError> {
    let phone_number = request
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let amount = request.amount.as_ref().filter(|a| !a.is_blank());

    let (Some(phone_number), Some(amount)) = (phone_number, amount) else {
        return Err(SubmissionError::Validation(
            "phoneNumber and amount are required".to_string(),
        ));
    };

    let amount = amount.to_positive_amount().ok_or_else(|| {
        SubmissionError::Validation("amount must be a positive number".to_string())
    })?;

    Ok((phone_number.to_string(), amount))
}

fn validate_refund(
    request: &RefundSubmission,
) -> Result<(String, Option<String>), SubmissionError> {
    let deposit_id = request
        .deposit_id
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| SubmissionError::Validation("depositId is required".to_string()))?;

    let amount = match request.amount.as_ref().filter(|a| !a.is_blank()) {
        Some(amount) => Some(amount.to_positive_amount().ok_or_else(|| {
            SubmissionError::Validation("amount must be a positive number".to_string())
        })?),
        None => None,
    };

    Ok((deposit_id.to_string(), amount))
}
