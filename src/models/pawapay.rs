//! Request and response bodies exchanged with the pawaPay v2 API.
//!
//! Response types keep any fields they don't model in an `extra` map so that
//! pass-through endpoints return what upstream sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of `POST /v2/predict-provider`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderPrediction {
    pub provider: String,
    /// Sanitized MSISDN as upstream wants it in payloads
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationType {
    Deposit,
    Payout,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "DEPOSIT",
            OperationType::Payout => "PAYOUT",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of `GET /v2/active-conf`: country -> provider -> currency -> operation types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveConfiguration {
    #[serde(default)]
    pub countries: Vec<CountryConfiguration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub providers: Vec<ProviderConfiguration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfiguration {
    pub provider: String,
    #[serde(default)]
    pub currencies: Vec<CurrencyConfiguration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyConfiguration {
    pub currency: String,
    #[serde(default)]
    pub operation_types: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurrencyConfiguration {
    /// Upstream sends a settings object per supported operation; absent, `null`
    /// and `false` all mean unsupported.
    pub fn supports(&self, operation: OperationType) -> bool {
        !matches!(
            self.operation_types.get(operation.as_str()),
            None | Some(Value::Null) | Some(Value::Bool(false))
        )
    }
}

impl ActiveConfiguration {
    /// First currency, in country/provider/currency list order, that `provider`
    /// offers for `operation`.
    ///
    /// When both the prediction and a country entry name a country, entries for
    /// other countries are skipped.
    pub fn resolve_currency(
        &self,
        country: Option<&str>,
        provider: &str,
        operation: OperationType,
    ) -> Option<&str> {
        self.countries
            .iter()
            .filter(|c| match (country, c.country.as_deref()) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => true,
            })
            .flat_map(|c| c.providers.iter())
            .filter(|p| p.provider == provider)
            .flat_map(|p| p.currencies.iter())
            .find(|c| c.supports(operation))
            .map(|c| c.currency.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub phone_number: String,
    pub provider: String,
}

/// Payer of a deposit or recipient of a payout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileMoneyAccount {
    #[serde(rename = "type")]
    pub account_type: String,
    pub account_details: AccountDetails,
}

impl MobileMoneyAccount {
    pub fn mmo(phone_number: &str, provider: &str) -> Self {
        Self {
            account_type: "MMO".to_string(),
            account_details: AccountDetails {
                phone_number: phone_number.to_string(),
                provider: provider.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub deposit_id: String,
    pub amount: String,
    pub currency: String,
    pub payer: MobileMoneyAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutRequest {
    pub payout_id: String,
    pub amount: String,
    pub currency: String,
    pub recipient: MobileMoneyAccount,
}

/// Refund of a prior deposit; no amount means the full deposited amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub refund_id: String,
    pub deposit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

/// Payload actually sent upstream, echoed back to the caller as `requestSent`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestSent {
    Deposit(DepositRequest),
    Payout(PayoutRequest),
    Refund(RefundRequest),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_conf() -> ActiveConfiguration {
        serde_json::from_value(json!({
            "companyName": "Sandbox Ltd",
            "countries": [
                {
                    "country": "ZMB",
                    "displayName": { "en": "Zambia" },
                    "providers": [
                        {
                            "provider": "AIRTEL_OAPI_ZMB",
                            "currencies": [
                                { "currency": "ZMW", "operationTypes": { "DEPOSIT": {} } }
                            ]
                        },
                        {
                            "provider": "MTN_MOMO_ZMB",
                            "currencies": [
                                {
                                    "currency": "USD",
                                    "operationTypes": { "PAYOUT": { "minAmount": "1" } }
                                },
                                {
                                    "currency": "ZMW",
                                    "operationTypes": {
                                        "DEPOSIT": { "minAmount": "1" },
                                        "PAYOUT": {}
                                    }
                                }
                            ]
                        }
                    ]
                },
                {
                    "country": "GHA",
                    "providers": [
                        {
                            "provider": "MTN_MOMO_GHA",
                            "currencies": [
                                {
                                    "currency": "GHS",
                                    "operationTypes": { "DEPOSIT": null, "PAYOUT": false }
                                }
                            ]
                        }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_currency_matches_provider_and_operation() {
        let conf = sample_conf();

        assert_eq!(
            conf.resolve_currency(Some("ZMB"), "MTN_MOMO_ZMB", OperationType::Deposit),
            Some("ZMW")
        );
        assert_eq!(
            conf.resolve_currency(Some("ZMB"), "AIRTEL_OAPI_ZMB", OperationType::Deposit),
            Some("ZMW")
        );
    }

    #[test]
    fn test_resolve_currency_first_match_wins() {
        let conf = sample_conf();

        // USD is listed before ZMW for payouts
        for _ in 0..3 {
            assert_eq!(
                conf.resolve_currency(Some("ZMB"), "MTN_MOMO_ZMB", OperationType::Payout),
                Some("USD")
            );
        }
    }

    #[test]
    fn test_resolve_currency_without_country_searches_everything() {
        let conf = sample_conf();
        assert_eq!(
            conf.resolve_currency(None, "MTN_MOMO_ZMB", OperationType::Deposit),
            Some("ZMW")
        );
    }

    #[test]
    fn test_resolve_currency_none_when_missing_or_disabled() {
        let conf = sample_conf();

        assert_eq!(
            conf.resolve_currency(Some("ZMB"), "VODAFONE_GHA", OperationType::Deposit),
            None
        );
        assert_eq!(
            conf.resolve_currency(Some("ZMB"), "AIRTEL_OAPI_ZMB", OperationType::Payout),
            None
        );
        // null and false are not enabled
        assert_eq!(
            conf.resolve_currency(Some("GHA"), "MTN_MOMO_GHA", OperationType::Deposit),
            None
        );
        assert_eq!(
            conf.resolve_currency(Some("GHA"), "MTN_MOMO_GHA", OperationType::Payout),
            None
        );
        // Country mismatch
        assert_eq!(
            conf.resolve_currency(Some("GHA"), "MTN_MOMO_ZMB", OperationType::Deposit),
            None
        );
    }

    #[test]
    fn test_active_conf_keeps_unmodelled_fields() {
        let conf = sample_conf();
        let value = serde_json::to_value(&conf).unwrap();

        assert_eq!(value["companyName"], "Sandbox Ltd");
        assert_eq!(value["countries"][0]["displayName"]["en"], "Zambia");
        let usd = &value["countries"][0]["providers"][1]["currencies"][0];
        assert_eq!(usd["operationTypes"]["PAYOUT"]["minAmount"], "1");
    }

    #[test]
    fn test_deposit_payload_shape() {
        let payload = DepositRequest {
            deposit_id: "d-1".to_string(),
            amount: "15".to_string(),
            currency: "ZMW".to_string(),
            payer: MobileMoneyAccount::mmo("260763456789", "MTN_MOMO_ZMB"),
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "depositId": "d-1",
                "amount": "15",
                "currency": "ZMW",
                "payer": {
                    "type": "MMO",
                    "accountDetails": { "phoneNumber": "260763456789", "provider": "MTN_MOMO_ZMB" }
                }
            })
        );
    }

    #[test]
    fn test_refund_payload_omits_missing_amount() {
        let payload = RefundRequest {
            refund_id: "r-1".to_string(),
            deposit_id: "d-1".to_string(),
            amount: None,
        };

        assert_eq!(
            serde_json::to_value(RequestSent::Refund(payload)).unwrap(),
            json!({ "refundId": "r-1", "depositId": "d-1" })
        );
    }
}
