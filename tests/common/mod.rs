#![allow(dead_code)]

use async_trait::async_trait;
use migration::MigratorTrait;
use pawapay_sandbox::models::pawapay::{
    ActiveConfiguration, DepositRequest, PayoutRequest, ProviderPrediction, RefundRequest,
};
use pawapay_sandbox::services::pawapay::{GatewayError, GatewayResult, PaymentGateway};
use pawapay_sandbox::services::transaction_log::TransactionLog;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Fresh in-memory SQLite database with the schema applied
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn setup_test_log() -> TransactionLog {
    TransactionLog::new(setup_test_db().await.expect("Failed to set up test DB"))
}

/// Scripted stand-in for the pawaPay API that records every call it receives
#[derive(Clone)]
pub struct MockGateway {
    pub prediction: GatewayResult<ProviderPrediction>,
    pub active_conf: GatewayResult<ActiveConfiguration>,
    pub initiation: GatewayResult<Value>,
    pub status: GatewayResult<Value>,
    pub balances: GatewayResult<Value>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub payloads: Arc<Mutex<Vec<Value>>>,
}

impl MockGateway {
    /// MTN Zambia number with ZMW enabled for deposits and payouts
    pub fn zambia() -> Self {
        Self {
            prediction: Ok(zambia_prediction()),
            active_conf: Ok(zambia_conf()),
            initiation: Ok(json!({ "status": "ACCEPTED", "created": "2026-10-18T10:00:00Z" })),
            status: Ok(json!({ "status": "FOUND", "data": { "status": "COMPLETED" } })),
            balances: Ok(json!({
                "balances": [{ "country": "ZMB", "balance": "1000.00", "currency": "ZMW" }]
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn payloads(&self) -> Vec<Value> {
        self.payloads.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn record_payload(&self, payload: Value) {
        self.payloads.lock().unwrap().push(payload);
    }
}

pub fn zambia_prediction() -> ProviderPrediction {
    serde_json::from_value(json!({
        "country": "ZMB",
        "provider": "MTN_MOMO_ZMB",
        "phoneNumber": "260763456789"
    }))
    .unwrap()
}

pub fn zambia_conf() -> ActiveConfiguration {
    serde_json::from_value(json!({
        "companyName": "Sandbox Ltd",
        "countries": [{
            "country": "ZMB",
            "providers": [{
                "provider": "MTN_MOMO_ZMB",
                "currencies": [{
                    "currency": "ZMW",
                    "operationTypes": {
                        "DEPOSIT": { "minAmount": "1" },
                        "PAYOUT": { "minAmount": "1" }
                    }
                }]
            }]
        }]
    }))
    .unwrap()
}

pub fn upstream_rejection() -> GatewayError {
    GatewayError::Upstream {
        status: 400,
        body: Some(json!({
            "failureReason": {
                "failureCode": "INVALID_PHONE_NUMBER",
                "failureMessage": "Invalid MSISDN"
            }
        })),
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn predict_provider(&self, phone_number: &str) -> GatewayResult<ProviderPrediction> {
        self.record(format!("predict-provider {phone_number}"));
        self.prediction.clone()
    }

    async fn fetch_active_conf(&self) -> GatewayResult<ActiveConfiguration> {
        self.record("active-conf");
        self.active_conf.clone()
    }

    async fn initiate_deposit(&self, payload: &DepositRequest) -> GatewayResult<Value> {
        self.record("deposit");
        self.record_payload(serde_json::to_value(payload).unwrap());
        self.initiation.clone()
    }

    async fn initiate_payout(&self, payload: &PayoutRequest) -> GatewayResult<Value> {
        self.record("payout");
        self.record_payload(serde_json::to_value(payload).unwrap());
        self.initiation.clone()
    }

    async fn initiate_refund(&self, payload: &RefundRequest) -> GatewayResult<Value> {
        self.record("refund");
        self.record_payload(serde_json::to_value(payload).unwrap());
        self.initiation.clone()
    }

    async fn check_deposit_status(&self, deposit_id: &str) -> GatewayResult<Value> {
        self.record(format!("deposit-status {deposit_id}"));
        self.status.clone()
    }

    async fn check_payout_status(&self, payout_id: &str) -> GatewayResult<Value> {
        self.record(format!("payout-status {payout_id}"));
        self.status.clone()
    }

    async fn check_refund_status(&self, refund_id: &str) -> GatewayResult<Value> {
        self.record(format!("refund-status {refund_id}"));
        self.status.clone()
    }

    async fn fetch_wallet_balances(&self, country: Option<&str>) -> GatewayResult<Value> {
        self.record(format!("wallet-balances {}", country.unwrap_or("*")));
        self.balances.clone()
    }
}
