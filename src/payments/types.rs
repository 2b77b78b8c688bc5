use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Checkout flow selected by the `{flow}` path segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFlow {
    /// Core API charge with `payment_type = qris`.
    Qris,
    /// Hosted checkout session.
    Snap,
    /// Placeholder records created from webhooks for orders this process never saw.
    Unknown,
}

impl PaymentFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentFlow::Qris => "qris",
            PaymentFlow::Snap => "snap",
            PaymentFlow::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PaymentFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentFlow {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "qris" => Ok(PaymentFlow::Qris),
            "snap" => Ok(PaymentFlow::Snap),
            other => Err(format!("unsupported flow: {}", other)),
        }
    }
}

/// Canonical Midtrans `transaction_status` values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Settlement,
    Capture,
    Expire,
    Cancel,
    Deny,
    Failure,
    Authorize,
    Refund,
    PartialRefund,
    Chargeback,
    PartialChargeback,
    Unknown,
}

pub const FINAL_STATUSES: [TransactionStatus; 6] = [
    TransactionStatus::Settlement,
    TransactionStatus::Capture,
    TransactionStatus::Expire,
    TransactionStatus::Cancel,
    TransactionStatus::Deny,
    TransactionStatus::Failure,
];

impl TransactionStatus {
    /// Normalizes a raw gateway status. Absent or unrecognized values map to `Unknown`.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("pending") => TransactionStatus::Pending,
            Some("settlement") => TransactionStatus::Settlement,
            Some("capture") => TransactionStatus::Capture,
            Some("expire") => TransactionStatus::Expire,
            Some("cancel") => TransactionStatus::Cancel,
            Some("deny") => TransactionStatus::Deny,
            Some("failure") => TransactionStatus::Failure,
            Some("authorize") => TransactionStatus::Authorize,
            Some("refund") => TransactionStatus::Refund,
            Some("partial_refund") => TransactionStatus::PartialRefund,
            Some("chargeback") => TransactionStatus::Chargeback,
            Some("partial_chargeback") => TransactionStatus::PartialChargeback,
            _ => TransactionStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Settlement => "settlement",
            TransactionStatus::Capture => "capture",
            TransactionStatus::Expire => "expire",
            TransactionStatus::Cancel => "cancel",
            TransactionStatus::Deny => "deny",
            TransactionStatus::Failure => "failure",
            TransactionStatus::Authorize => "authorize",
            TransactionStatus::Refund => "refund",
            TransactionStatus::PartialRefund => "partial_refund",
            TransactionStatus::Chargeback => "chargeback",
            TransactionStatus::PartialChargeback => "partial_chargeback",
            TransactionStatus::Unknown => "unknown",
        }
    }

    pub fn is_final(&self) -> bool {
        FINAL_STATUSES.contains(self)
    }

    /// Final and paid.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Settlement | TransactionStatus::Capture
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GatewayEnvironment {
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayEnvironment::Sandbox => "sandbox",
            GatewayEnvironment::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDetail {
    pub id: String,
    pub price: i64,
    pub quantity: u32,
    pub name: String,
}

/// Fixed expiry window starting at `start_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub start_time: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl ExpiryPolicy {
    pub fn starting_now(duration_minutes: u32) -> Self {
        Self {
            start_time: Utc::now(),
            duration_minutes,
        }
    }

    /// Gateway timestamp format, always with an explicit `+0000` offset.
    pub fn formatted_start(&self) -> String {
        self.start_time.format("%Y-%m-%d %H:%M:%S %z").to_string()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.start_time + Duration::minutes(i64::from(self.duration_minutes))
    }
}

#[derive(Debug, Clone)]
pub struct ChargeSpec {
    pub order_id: String,
    pub gross_amount: i64,
    pub item_details: Vec<ItemDetail>,
    pub expiry: ExpiryPolicy,
    pub flow: PaymentFlow,
    /// Optional QRIS acquirer hint, e.g. `gopay`.
    pub acquirer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentArtifact {
    QrUrl { url: String },
    QrString { value: String },
    SnapToken {
        token: String,
        redirect_url: Option<String>,
    },
}

impl PaymentArtifact {
    pub fn snap_token(&self) -> Option<&str> {
        match self {
            PaymentArtifact::SnapToken { token, .. } => Some(token),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChargeResult {
    pub artifact: Option<PaymentArtifact>,
    pub raw: JsonValue,
}

#[derive(Debug, Clone)]
pub struct StatusResult {
    pub status: TransactionStatus,
    pub raw: JsonValue,
}

/// Entry of the `actions` array returned by a QRIS charge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayAction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn finality_is_closed_set_membership() {
        for status in FINAL_STATUSES {
            assert!(status.is_final(), "{} should be final", status);
        }
        assert!(!TransactionStatus::Pending.is_final());
        assert!(!TransactionStatus::Unknown.is_final());
        assert!(!TransactionStatus::Refund.is_final());
        assert!(!TransactionStatus::Authorize.is_final());
    }

    #[test]
    fn unrecognized_status_normalizes_to_unknown() {
        assert_eq!(TransactionStatus::normalize(None), TransactionStatus::Unknown);
        assert_eq!(
            TransactionStatus::normalize(Some("teleported")),
            TransactionStatus::Unknown
        );
        assert_eq!(
            TransactionStatus::normalize(Some("SETTLEMENT")),
            TransactionStatus::Settlement
        );
    }

    #[test]
    fn expiry_is_formatted_with_explicit_offset() {
        let policy = ExpiryPolicy {
            start_time: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            duration_minutes: 15,
        };
        assert_eq!(policy.formatted_start(), "2026-01-02 03:04:05 +0000");
        assert_eq!(
            policy.expires_at(),
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 19, 5).unwrap()
        );
    }

    #[test]
    fn flow_parsing_works() {
        assert_eq!("QRIS".parse::<PaymentFlow>(), Ok(PaymentFlow::Qris));
        assert_eq!("snap".parse::<PaymentFlow>(), Ok(PaymentFlow::Snap));
        assert!("unknown".parse::<PaymentFlow>().is_err());
    }

    #[test]
    fn artifact_serializes_with_kind_tag() {
        let artifact = PaymentArtifact::SnapToken {
            token: "tok".to_string(),
            redirect_url: None,
        };
        let json = serde_json::to_value(&artifact).expect("serialization should succeed");
        assert_eq!(json["kind"], "snap_token");
        assert_eq!(artifact.snap_token(), Some("tok"));
    }
}
