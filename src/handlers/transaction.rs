use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::entities::transactions;
use crate::models::transaction::{
    ApiResponse, RefundSubmission, SubmissionResponse, SubmissionStep, TransactionRequest,
};
use crate::services::orchestration::{
    SubmissionContext, SubmissionError, SubmissionFailure, TransferKind,
};
use crate::AppState;

pub async fn submit_deposit(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> (StatusCode, Json<SubmissionResponse>) {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected_body(rejection),
    };
    submit_transfer(&state, TransferKind::Deposit, &payload).await
}

pub async fn submit_payout(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> (StatusCode, Json<SubmissionResponse>) {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected_body(rejection),
    };
    submit_transfer(&state, TransferKind::Payout, &payload).await
}

async fn submit_transfer(
    state: &AppState,
    kind: TransferKind,
    payload: &TransactionRequest,
) -> (StatusCode, Json<SubmissionResponse>) {
    match state.transactions.submit_transaction(kind, payload).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt.into())),
        Err(failure) => failure_response(failure),
    }
}

pub async fn submit_refund(
    State(state): State<AppState>,
    payload: Result<Json<RefundSubmission>, JsonRejection>,
) -> (StatusCode, Json<SubmissionResponse>) {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected_body(rejection),
    };
    match state.transactions.submit_refund(&payload).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt.into())),
        Err(failure) => failure_response(failure),
    }
}

// Unreadable bodies get the same result shape as any other validation failure
fn rejected_body(rejection: JsonRejection) -> (StatusCode, Json<SubmissionResponse>) {
    tracing::warn!("Rejected submission body: {}", rejection.body_text());
    failure_response(SubmissionFailure {
        step: SubmissionStep::Validation,
        context: SubmissionContext::default(),
        error: SubmissionError::Validation(rejection.body_text()),
    })
}

// Upstream and resolution failures are ordinary results for the dashboard
fn failure_response(failure: SubmissionFailure) -> (StatusCode, Json<SubmissionResponse>) {
    let status = match failure.error {
        SubmissionError::Validation(_) => StatusCode::BAD_REQUEST,
        SubmissionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SubmissionError::Upstream(_) | SubmissionError::Resolution { .. } => StatusCode::OK,
    };
    (status, Json(failure.into()))
}

pub async fn list_transactions(
    State(state): State<AppState>,
) -> Result<
    Json<ApiResponse<Vec<transactions::Model>>>,
    (StatusCode, Json<ApiResponse<()>>),
> {
    let records = state.transaction_log.list_all().await.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(format!("Database error: {}", e))),
        )
    })?;

    Ok(Json(ApiResponse::ok(records)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<transactions::Model>>, (StatusCode, Json<ApiResponse<()>>)> {
    state
        .transaction_log
        .find_by_any_identifier(&id)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(format!("Database error: {}", e))),
            )
        })?
        .map(|record| Json(ApiResponse::ok(record)))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::err(format!("Transaction {} not found", id))),
            )
        })
}
