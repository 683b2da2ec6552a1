use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-authoritative redemption status. The client only displays what the
/// server returns; it never infers a status from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedemptionStatus {
    OtpSent,
    Verified,
    Used,
    Expired,
    Pending,
    Cancelled,
}

/// One customer's claim against an offer, as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub id: i64,
    #[serde(default)]
    pub offer_id: Option<i64>,
    #[serde(default)]
    pub offer_name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_mobile: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Opaque; meaningful only after OTP verification.
    #[serde(default)]
    pub redemption_code: Option<String>,
    pub status: RedemptionStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub redeemed_at: Option<String>,
}

/// Contact triple collected by the claim form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_name: String,
    pub customer_mobile: String,
    pub customer_email: String,
}

/// Success payload of OTP verification: everything the success screen shows,
/// verbatim from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub redemption_code: String,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Business status codes the validate endpoint can attach to a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    AlreadyUsed,
    CodeExpired,
    InvalidCode,
    Other,
}

impl ValidationCode {
    pub fn from_wire(code: &str) -> Self {
        match code {
            "ALREADY_USED" => ValidationCode::AlreadyUsed,
            "CODE_EXPIRED" => ValidationCode::CodeExpired,
            "INVALID_CODE" => ValidationCode::InvalidCode,
            _ => ValidationCode::Other,
        }
    }
}

/// One entry in the staff validator's recent-history list. Cosmetic only;
/// the server remains the sole arbiter of redemption status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub redemption_code: String,
    #[serde(default)]
    pub redemption: Option<Redemption>,
    pub message: String,
    pub validated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&RedemptionStatus::OtpSent).unwrap(),
            "\"otp_sent\""
        );
        assert_eq!(
            serde_json::from_str::<RedemptionStatus>("\"used\"").unwrap(),
            RedemptionStatus::Used
        );
    }

    #[test]
    fn validation_code_mapping() {
        assert_eq!(
            ValidationCode::from_wire("ALREADY_USED"),
            ValidationCode::AlreadyUsed
        );
        assert_eq!(
            ValidationCode::from_wire("CODE_EXPIRED"),
            ValidationCode::CodeExpired
        );
        assert_eq!(
            ValidationCode::from_wire("INVALID_CODE"),
            ValidationCode::InvalidCode
        );
        assert_eq!(ValidationCode::from_wire("SOMETHING_NEW"), ValidationCode::Other);
    }

    #[test]
    fn redemption_tolerates_sparse_payloads() {
        let r: Redemption =
            serde_json::from_str(r#"{"id": 7, "status": "pending"}"#).unwrap();
        assert_eq!(r.status, RedemptionStatus::Pending);
        assert_eq!(r.redemption_code, None);
        assert_eq!(r.redeemed_at, None);
    }
}
