use serde::{Deserialize, Serialize};

pub type BatchId = i64;

/// A cohort of students.
///
/// `total_students` is a denormalized counter kept in step with the
/// `students` table by the service layer; it is never written directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub name: String,
    pub total_students: i64,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.total_students == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_serializes_with_counter() {
        let batch = Batch {
            id: 1,
            name: "A".into(),
            total_students: 0,
        };
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "A", "total_students": 0})
        );
        assert!(batch.is_empty());
    }
}
