//! `SeaORM` Entity prelude

pub use super::transactions::Entity as Transactions;
