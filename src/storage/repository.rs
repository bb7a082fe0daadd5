use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{
    Amount, Batch, BatchId, NewPayment, Payment, PaymentStatus, Student, StudentId,
};

use super::MIGRATION_001_INITIAL;

/// Repository owning the SQLite connection pool.
///
/// All reads and writes go through a [`LedgerTx`] obtained from
/// [`Repository::begin`], so every unit of work sees one consistent snapshot
/// and commits (or rolls back) as a whole.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    /// Creates the database file if it doesn't exist and enforces foreign keys
    /// on every pooled connection. WAL lets readers proceed while a writer
    /// holds the write lock.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. The schema is idempotent, so this is safe on
    /// every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Begin a read transaction. Dropping the returned [`LedgerTx`] without
    /// calling [`LedgerTx::commit`] rolls everything back.
    pub async fn begin(&self) -> Result<LedgerTx> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(LedgerTx { tx })
    }

    /// Begin a transaction that will write.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`), so concurrent
    /// writers queue on SQLite's busy timeout. A deferred transaction that
    /// reads first and writes later would instead fail with SQLITE_BUSY when
    /// two of them try to upgrade at once.
    pub async fn begin_write(&self) -> Result<LedgerTx> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .context("Failed to begin write transaction")?;
        Ok(LedgerTx { tx })
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// A request-scoped unit of work over the ledger tables.
pub struct LedgerTx {
    tx: Transaction<'static, Sqlite>,
}

impl LedgerTx {
    pub async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit transaction")
    }

    // ========================
    // Batch operations
    // ========================

    /// Insert a batch with an empty roster.
    /// Returns `None` when a batch with the same name already exists.
    pub async fn insert_batch(&mut self, name: &str) -> Result<Option<Batch>> {
        let row = sqlx::query(
            r#"
            INSERT INTO batches (name, total_students)
            VALUES (?, 0)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name, total_students
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to save batch")?;

        row.as_ref().map(row_to_batch).transpose()
    }

    /// Get a batch by ID.
    pub async fn get_batch(&mut self, id: BatchId) -> Result<Option<Batch>> {
        let row = sqlx::query("SELECT id, name, total_students FROM batches WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to fetch batch")?;

        row.as_ref().map(row_to_batch).transpose()
    }

    /// Get a batch by name.
    pub async fn get_batch_by_name(&mut self, name: &str) -> Result<Option<Batch>> {
        let row = sqlx::query("SELECT id, name, total_students FROM batches WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to fetch batch by name")?;

        row.as_ref().map(row_to_batch).transpose()
    }

    /// List all batches.
    pub async fn list_batches(&mut self) -> Result<Vec<Batch>> {
        let rows = sqlx::query("SELECT id, name, total_students FROM batches ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await
            .context("Failed to list batches")?;

        rows.iter().map(row_to_batch).collect()
    }

    /// Bump a batch's student counter by one.
    /// The increment happens in SQL so concurrent writers cannot lose updates.
    pub async fn increment_total_students(&mut self, id: BatchId) -> Result<()> {
        let result =
            sqlx::query("UPDATE batches SET total_students = total_students + 1 WHERE id = ?")
                .bind(id)
                .execute(&mut *self.tx)
                .await
                .context("Failed to update batch student count")?;

        if result.rows_affected() != 1 {
            anyhow::bail!("Batch {id} disappeared while adding a student");
        }
        Ok(())
    }

    // ========================
    // Student operations
    // ========================

    /// Insert an unpaid student into a batch.
    pub async fn insert_student(&mut self, name: &str, batch_id: BatchId) -> Result<Student> {
        let row = sqlx::query(
            r#"
            INSERT INTO students (name, batch_id, payment_status, amount, last_payment_date)
            VALUES (?, ?, ?, 0, NULL)
            RETURNING id, name, batch_id, payment_status, amount, last_payment_date
            "#,
        )
        .bind(name)
        .bind(batch_id)
        .bind(PaymentStatus::Unpaid.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to save student")?;

        row_to_student(&row)
    }

    /// Get a student by ID.
    pub async fn get_student(&mut self, id: StudentId) -> Result<Option<Student>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, batch_id, payment_status, amount, last_payment_date
            FROM students
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to fetch student")?;

        row.as_ref().map(row_to_student).transpose()
    }

    /// List the students of one batch.
    pub async fn list_students_for_batch(&mut self, batch_id: BatchId) -> Result<Vec<Student>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, batch_id, payment_status, amount, last_payment_date
            FROM students
            WHERE batch_id = ?
            ORDER BY id
            "#,
        )
        .bind(batch_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list students for batch")?;

        rows.iter().map(row_to_student).collect()
    }

    /// Overwrite a student's payment summary with the given payment.
    pub async fn mark_student_paid(
        &mut self,
        id: StudentId,
        amount: Amount,
        date: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE students
            SET payment_status = ?, amount = ?, last_payment_date = ?
            WHERE id = ?
            "#,
        )
        .bind(PaymentStatus::Paid.as_str())
        .bind(amount)
        .bind(date.to_rfc3339())
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to update student payment summary")?;

        if result.rows_affected() != 1 {
            anyhow::bail!("Student {id} disappeared while recording a payment");
        }
        Ok(())
    }

    // ========================
    // Payment operations
    // ========================

    /// Insert a payment dated `date`.
    pub async fn insert_payment(
        &mut self,
        payment: &NewPayment,
        date: DateTime<Utc>,
    ) -> Result<Payment> {
        let row = sqlx::query(
            r#"
            INSERT INTO payments (student_id, date, amount, transaction_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, student_id, date, amount, transaction_id
            "#,
        )
        .bind(payment.student_id)
        .bind(date.to_rfc3339())
        .bind(payment.amount)
        .bind(&payment.transaction_id)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to save payment")?;

        row_to_payment(&row)
    }

    /// List all payments recorded for a student.
    pub async fn list_payments_for_student(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, date, amount, transaction_id
            FROM payments
            WHERE student_id = ?
            ORDER BY id
            "#,
        )
        .bind(student_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to list payments for student")?;

        rows.iter().map(row_to_payment).collect()
    }
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid {field} timestamp: {value}"))?
        .with_timezone(&Utc))
}

fn row_to_batch(row: &SqliteRow) -> Result<Batch> {
    Ok(Batch {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        total_students: row.try_get("total_students")?,
    })
}

fn row_to_student(row: &SqliteRow) -> Result<Student> {
    let status_str: String = row.try_get("payment_status")?;
    let last_payment_str: Option<String> = row.try_get("last_payment_date")?;

    Ok(Student {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        batch_id: row.try_get("batch_id")?,
        payment_status: PaymentStatus::from_str(&status_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid payment status: {}", status_str))?,
        amount: row.try_get("amount")?,
        last_payment_date: last_payment_str
            .map(|s| parse_timestamp(&s, "last_payment_date"))
            .transpose()?,
    })
}

fn row_to_payment(row: &SqliteRow) -> Result<Payment> {
    let date_str: String = row.try_get("date")?;

    Ok(Payment {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        date: parse_timestamp(&date_str, "payment date")?,
        amount: row.try_get("amount")?,
        transaction_id: row.try_get("transaction_id")?,
    })
}
