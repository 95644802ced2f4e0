use serde::{Deserialize, Serialize};

pub const STATUS_OK: &str = "OK";
pub const STATUS_ERROR: &str = "ERROR";
pub const WITHDRAW_REQUEST_TAG: &str = "withdrawRequest";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// `{status, reason?}` envelope shared by every voucher response.
pub struct LnurlStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LnurlStatus {
    pub fn ok() -> Self {
        Self {
            status: STATUS_OK.to_string(),
            reason: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            reason: Some(reason.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_ERROR)
    }

    pub fn reason_or_default(&self) -> String {
        self.reason
            .clone()
            .filter(|reason| !reason.trim().is_empty())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Withdraw parameters advertised by a voucher target.
pub struct WithdrawRequest {
    #[serde(default)]
    pub callback: String,
    #[serde(default)]
    pub k1: String,
    #[serde(default)]
    pub max_withdrawable: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub min_withdrawable: u64,
    #[serde(default)]
    pub default_description: String,
    #[serde(default)]
    pub tag: String,
    #[serde(flatten)]
    pub status: LnurlStatus,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Query of the parameter endpoint; every field arrives as raw text.
pub struct WithdrawParamsQuery {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub max: Option<String>,
    #[serde(default)]
    pub challenge: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Query of the invoice endpoint.
pub struct InvoiceSubmission {
    #[serde(default)]
    pub k1: Option<String>,
    #[serde(default)]
    pub pr: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unit_withdraw_request_serializes_wire_field_names() {
        let request = WithdrawRequest {
            callback: "https://bot.example/cb".to_string(),
            k1: "k".to_string(),
            max_withdrawable: 21_000,
            min_withdrawable: 0,
            default_description: "@alice".to_string(),
            tag: WITHDRAW_REQUEST_TAG.to_string(),
            status: LnurlStatus::ok(),
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({
                "callback": "https://bot.example/cb",
                "k1": "k",
                "maxWithdrawable": 21000,
                "defaultDescription": "@alice",
                "tag": "withdrawRequest",
                "status": "OK"
            })
        );
    }

    #[test]
    fn unit_remote_response_without_status_is_not_an_error() {
        let parsed: WithdrawRequest = serde_json::from_value(json!({
            "callback": "https://remote/cb",
            "k1": "abc",
            "maxWithdrawable": 5000,
            "minWithdrawable": 1000,
            "tag": "withdrawRequest"
        }))
        .expect("deserialize");
        assert!(!parsed.status.is_error());
        assert_eq!(parsed.min_withdrawable, 1000);

        let failed: LnurlStatus =
            serde_json::from_value(json!({"status": "error"})).expect("deserialize");
        assert!(failed.is_error());
        assert_eq!(failed.reason_or_default(), "unknown error");
    }
}
