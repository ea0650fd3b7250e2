//! Read-only pass-throughs to pawaPay. None of these touch the transaction log.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::entities::transactions::TransactionType;
use crate::models::pawapay::ActiveConfiguration;
use crate::models::transaction::{ApiResponse, WalletBalancesQuery};
use crate::services::pawapay::GatewayResult;
use crate::AppState;

fn envelope<T: Serialize>(result: GatewayResult<T>) -> Json<ApiResponse<T>> {
    match result {
        Ok(data) => Json(ApiResponse::ok(data)),
        Err(e) => Json(ApiResponse::err(e.to_payload())),
    }
}

pub async fn get_active_conf(
    State(state): State<AppState>,
) -> Json<ApiResponse<ActiveConfiguration>> {
    envelope(state.transactions.active_configuration().await)
}

pub async fn get_deposit_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ApiResponse<Value>> {
    envelope(
        state
            .transactions
            .check_status(TransactionType::Deposit, &id)
            .await,
    )
}

pub async fn get_payout_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ApiResponse<Value>> {
    envelope(
        state
            .transactions
            .check_status(TransactionType::Payout, &id)
            .await,
    )
}

pub async fn get_refund_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ApiResponse<Value>> {
    envelope(
        state
            .transactions
            .check_status(TransactionType::Refund, &id)
            .await,
    )
}

pub async fn get_wallet_balances(
    State(state): State<AppState>,
    Query(query): Query<WalletBalancesQuery>,
) -> Json<ApiResponse<Value>> {
    let country = query
        .country
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    envelope(state.transactions.wallet_balances(country).await)
}
