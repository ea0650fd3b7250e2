//! Append-only log of submitted deposits, payouts and refunds
//!
//! Rows are written once and never updated or deleted. The database assigns
//! the sequence number; the timestamp is taken at insert time.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::prelude::*;
use crate::entities::transactions::{self, TransactionType};

/// A record about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    /// Stored as deposit, payout or refund id according to `transaction_type`
    pub identifier: String,
    pub refunded_deposit_id: Option<String>,
    pub amount: String,
    pub currency: Option<String>,
    pub phone_number: Option<String>,
    pub provider: Option<String>,
    pub country: Option<String>,
    pub status: String,
}

#[derive(Clone)]
pub struct TransactionLog {
    db: DatabaseConnection,
}

impl TransactionLog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn append(&self, entry: NewTransaction) -> Result<transactions::Model, DbErr> {
        let identifier = Some(entry.identifier);
        let (deposit_id, payout_id, refund_id) = match entry.transaction_type {
            TransactionType::Deposit => (identifier, None, None),
            TransactionType::Payout => (None, identifier, None),
            TransactionType::Refund => (None, None, identifier),
        };

        let record = transactions::ActiveModel {
            transaction_type: Set(entry.transaction_type),
            deposit_id: Set(deposit_id),
            payout_id: Set(payout_id),
            refund_id: Set(refund_id),
            refunded_deposit_id: Set(entry.refunded_deposit_id),
            amount: Set(Some(entry.amount)),
            currency: Set(entry.currency),
            phone_number: Set(entry.phone_number),
            provider: Set(entry.provider),
            country: Set(entry.country),
            status: Set(Some(entry.status)),
            timestamp: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            "Logged {} #{} with status {}",
            record.transaction_type,
            record.id,
            record.status.as_deref().unwrap_or("UNKNOWN")
        );

        Ok(record)
    }

    /// All records, newest first
    pub async fn list_all(&self) -> Result<Vec<transactions::Model>, DbErr> {
        Transactions::find()
            .order_by_desc(transactions::Column::Id)
            .all(&self.db)
            .await
    }

    pub async fn find_by_any_identifier(
        &self,
        id: &str,
    ) -> Result<Option<transactions::Model>, DbErr> {
        Transactions::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::DepositId.eq(id))
                    .add(transactions::Column::PayoutId.eq(id))
                    .add(transactions::Column::RefundId.eq(id)),
            )
            .one(&self.db)
            .await
    }
}
