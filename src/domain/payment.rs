use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StudentId;

pub type PaymentId = i64;

/// Payment amounts are plain integers in the smallest unit the school bills
/// in. No floating point anywhere.
pub type Amount = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub student_id: StudentId,
    pub date: DateTime<Utc>,
    pub amount: Amount,
    pub transaction_id: Option<String>,
}

/// A payment that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub student_id: StudentId,
    pub amount: Amount,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl NewPayment {
    pub fn new(student_id: StudentId, amount: Amount) -> Self {
        Self {
            student_id,
            amount,
            transaction_id: None,
        }
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_payment_transaction_id_is_optional() {
        let payment: NewPayment =
            serde_json::from_str(r#"{"student_id": 1, "amount": 500}"#).unwrap();
        assert_eq!(payment, NewPayment::new(1, 500));

        let payment: NewPayment = serde_json::from_str(
            r#"{"student_id": 1, "amount": 500, "transaction_id": "TXN-1"}"#,
        )
        .unwrap();
        assert_eq!(payment.transaction_id.as_deref(), Some("TXN-1"));
    }

    #[test]
    fn test_with_transaction_id() {
        let payment = NewPayment::new(3, 50).with_transaction_id("UPI-42");
        assert_eq!(payment.student_id, 3);
        assert_eq!(payment.amount, 50);
        assert_eq!(payment.transaction_id, Some("UPI-42".to_string()));
    }
}
