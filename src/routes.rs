use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{pawapay, transaction};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/deposit", post(transaction::submit_deposit))
        .route("/payout", post(transaction::submit_payout))
        .route("/refund", post(transaction::submit_refund))
        .route("/transactions", get(transaction::list_transactions))
        .route("/transactions/{id}", get(transaction::get_transaction))
        .route("/active-conf", get(pawapay::get_active_conf))
        .route("/deposit-status/{id}", get(pawapay::get_deposit_status))
        .route("/payout-status/{id}", get(pawapay::get_payout_status))
        .route("/refund-status/{id}", get(pawapay::get_refund_status))
        .route("/wallet-balances", get(pawapay::get_wallet_balances));

    Router::new()
        .route("/", get(hello))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hello() -> &'static str {
    "pawaPay Sandbox Tester is running"
}
