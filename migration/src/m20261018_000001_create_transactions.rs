//! Migration to create the transactions table backing the append-only transaction log

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(string(Transactions::Type).not_null())
                    .col(string_null(Transactions::DepositId))
                    .col(string_null(Transactions::PayoutId))
                    .col(string_null(Transactions::RefundId))
                    .col(string_null(Transactions::RefundedDepositId))
                    .col(string_null(Transactions::Amount))
                    .col(string_null(Transactions::Currency))
                    .col(string_null(Transactions::PhoneNumber))
                    .col(string_null(Transactions::Provider))
                    .col(string_null(Transactions::Country))
                    .col(string_null(Transactions::Status))
                    .col(timestamp_with_time_zone(Transactions::Timestamp).not_null())
                    .to_owned(),
            )
            .await?;

        // Lookups by any of the three identifiers
        for (name, column) in [
            ("idx_transactions_deposit_id", Transactions::DepositId),
            ("idx_transactions_payout_id", Transactions::PayoutId),
            ("idx_transactions_refund_id", Transactions::RefundId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Transactions::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Type,
    DepositId,
    PayoutId,
    RefundId,
    RefundedDepositId,
    Amount,
    Currency,
    PhoneNumber,
    Provider,
    Country,
    Status,
    Timestamp,
}
