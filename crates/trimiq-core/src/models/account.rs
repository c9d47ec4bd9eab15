//! Account and authentication wire types.

use serde::{Deserialize, Serialize};

/// Account balance snapshot. Server-authoritative, never persisted locally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Balance {
    /// Spendable balance
    pub balance: f64,
    /// Cumulative ad revenue earned
    pub ad_revenue: f64,
}

/// Response from `POST /login`
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Body of `POST /register`
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Response from `POST /register`
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RegisterResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        let balance: Balance =
            serde_json::from_str(r#"{"balance": 123.4, "ad_revenue": 56.7}"#).unwrap();
        assert_eq!(balance.balance, 123.4);
        assert_eq!(balance.ad_revenue, 56.7);
    }

    #[test]
    fn test_parse_balance_integers() {
        let balance: Balance = serde_json::from_str(r#"{"balance": 0, "ad_revenue": 12}"#).unwrap();
        assert_eq!(balance.balance, 0.0);
        assert_eq!(balance.ad_revenue, 12.0);
    }

    #[test]
    fn test_parse_balance_rejects_missing_or_null_fields() {
        assert!(serde_json::from_str::<Balance>(r#"{"balance": 1.0}"#).is_err());
        assert!(serde_json::from_str::<Balance>(r#"{"balance": null, "ad_revenue": 1.0}"#).is_err());
        assert!(serde_json::from_str::<Balance>(r#"{"detail": "Invalid token"}"#).is_err());
    }

    #[test]
    fn test_parse_login_response() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"access_token": "abc.def.ghi", "token_type": "bearer"}"#).unwrap();
        assert_eq!(resp.access_token, "abc.def.ghi");
        assert_eq!(resp.token_type.as_deref(), Some("bearer"));
    }
}
