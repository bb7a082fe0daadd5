use chrono::Utc;
use tracing::{debug, info};

use crate::domain::{Batch, BatchId, NewPayment, Payment, Student, StudentId};
use crate::storage::{LedgerTx, Repository};

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (HTTP, CLI, tests).
///
/// Each public operation opens its own transaction, so the derived fields
/// (`Batch::total_students` and the student payment summary) are written
/// together with the rows they summarize or not at all. Mutating operations
/// take the write lock before their parent lookup.
#[derive(Clone)]
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open (creating if needed) the database at the given path and apply
    /// the schema.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Batch operations
    // ========================

    /// Create a new, empty batch.
    pub async fn create_batch(&self, name: String) -> Result<Batch, AppError> {
        let mut tx = self.repo.begin_write().await?;

        if tx.get_batch_by_name(&name).await?.is_some() {
            return Err(AppError::BatchAlreadyExists(name));
        }

        // The unique index still guards against a concurrent insert between
        // the check above and this statement.
        let batch = tx
            .insert_batch(&name)
            .await?
            .ok_or_else(|| AppError::BatchAlreadyExists(name))?;

        tx.commit().await?;
        info!(batch_id = batch.id, name = %batch.name, "created batch");
        Ok(batch)
    }

    /// List all batches.
    pub async fn list_batches(&self) -> Result<Vec<Batch>, AppError> {
        let mut tx = self.repo.begin().await?;
        let batches = tx.list_batches().await?;
        tx.commit().await?;
        Ok(batches)
    }

    /// Get a batch by ID.
    pub async fn get_batch(&self, id: BatchId) -> Result<Batch, AppError> {
        let mut tx = self.repo.begin().await?;
        let batch = Self::require_batch(&mut tx, id).await?;
        tx.commit().await?;
        Ok(batch)
    }

    /// List the students enrolled in a batch.
    pub async fn list_students_for_batch(&self, id: BatchId) -> Result<Vec<Student>, AppError> {
        let mut tx = self.repo.begin().await?;
        Self::require_batch(&mut tx, id).await?;
        let students = tx.list_students_for_batch(id).await?;
        tx.commit().await?;
        Ok(students)
    }

    // ========================
    // Student operations
    // ========================

    /// Enroll a new, unpaid student in an existing batch.
    pub async fn create_student(
        &self,
        name: String,
        batch_id: BatchId,
    ) -> Result<Student, AppError> {
        let mut tx = self.repo.begin_write().await?;
        Self::require_batch(&mut tx, batch_id).await?;

        let student = tx.insert_student(&name, batch_id).await?;
        tx.increment_total_students(batch_id).await?;

        tx.commit().await?;
        info!(student_id = student.id, batch_id, "enrolled student");
        Ok(student)
    }

    /// Get a student by ID.
    pub async fn get_student(&self, id: StudentId) -> Result<Student, AppError> {
        let mut tx = self.repo.begin().await?;
        let student = Self::require_student(&mut tx, id).await?;
        tx.commit().await?;
        Ok(student)
    }

    // ========================
    // Payment operations
    // ========================

    /// Record a payment and make it the student's latest payment.
    ///
    /// The student's `amount` is replaced by this payment's amount, not
    /// added to it.
    pub async fn create_payment(&self, payment: NewPayment) -> Result<Payment, AppError> {
        let mut tx = self.repo.begin_write().await?;
        Self::require_student(&mut tx, payment.student_id).await?;

        let date = Utc::now();
        let recorded = tx.insert_payment(&payment, date).await?;
        tx.mark_student_paid(payment.student_id, recorded.amount, recorded.date)
            .await?;

        tx.commit().await?;
        info!(
            payment_id = recorded.id,
            student_id = recorded.student_id,
            amount = recorded.amount,
            "recorded payment"
        );
        Ok(recorded)
    }

    /// List every payment recorded for a student.
    pub async fn list_payments_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<Payment>, AppError> {
        let mut tx = self.repo.begin().await?;
        Self::require_student(&mut tx, student_id).await?;
        let payments = tx.list_payments_for_student(student_id).await?;
        tx.commit().await?;
        Ok(payments)
    }

    // ========================
    // Lookups
    // ========================

    async fn require_batch(tx: &mut LedgerTx, id: BatchId) -> Result<Batch, AppError> {
        debug!(batch_id = id, "looking up batch");
        tx.get_batch(id).await?.ok_or(AppError::BatchNotFound(id))
    }

    async fn require_student(tx: &mut LedgerTx, id: StudentId) -> Result<Student, AppError> {
        debug!(student_id = id, "looking up student");
        tx.get_student(id).await?.ok_or(AppError::StudentNotFound(id))
    }
}
