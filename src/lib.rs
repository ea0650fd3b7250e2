// src/lib.rs

use std::sync::Arc;

use services::{
    orchestration::TransactionService, pawapay::PaymentGateway, transaction_log::TransactionLog,
};

#[derive(Clone)]
pub struct AppState {
    pub transaction_log: TransactionLog,
    pub transactions: TransactionService,
}

impl AppState {
    pub fn new(gateway: Arc<dyn PaymentGateway>, transaction_log: TransactionLog) -> Self {
        Self {
            transactions: TransactionService::new(gateway, transaction_log.clone()),
            transaction_log,
        }
    }
}

pub mod entities {
    pub mod prelude;
    pub mod transactions;
}

pub mod services {
    pub mod orchestration;
    pub mod pawapay;
    pub mod transaction_log;
}

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
