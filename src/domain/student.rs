use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, BatchId};

pub type StudentId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// No payment recorded yet
    #[default]
    Unpaid,
    /// At least one payment recorded
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unpaid" => Some(PaymentStatus::Unpaid),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A student enrolled in exactly one batch.
///
/// `payment_status`, `amount` and `last_payment_date` summarize the most
/// recent payment only. `amount` is overwritten on every payment, it is not
/// a running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub batch_id: BatchId,
    pub payment_status: PaymentStatus,
    pub amount: Amount,
    pub last_payment_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_roundtrip() {
        for status in [PaymentStatus::Unpaid, PaymentStatus::Paid] {
            let parsed = PaymentStatus::from_str(status.as_str()).unwrap();
            assert_eq!(status, parsed);
        }
        assert_eq!(PaymentStatus::from_str("PAID"), Some(PaymentStatus::Paid));
        assert_eq!(PaymentStatus::from_str("refunded"), None);
    }

    #[test]
    fn test_default_status_is_unpaid() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
    }

    #[test]
    fn test_unpaid_student_serializes_null_date() {
        let student = Student {
            id: 1,
            name: "S1".into(),
            batch_id: 1,
            payment_status: PaymentStatus::Unpaid,
            amount: 0,
            last_payment_date: None,
        };
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["payment_status"], "unpaid");
        assert_eq!(json["amount"], 0);
        assert!(json["last_payment_date"].is_null());
    }
}
