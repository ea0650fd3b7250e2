pub mod pawapay;
pub mod transaction;
