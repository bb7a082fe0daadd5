// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use chinmudra::application::LedgerService;
use chinmudra::domain::{Batch, Student};
use sqlx::{Row, SqlitePool};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::init(db_path(&temp_dir).to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

pub fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("test.db")
}

/// Count rows in a table through an independent connection, bypassing the
/// service entirely.
pub async fn count_rows(temp_dir: &TempDir, table: &str) -> Result<i64> {
    let url = format!("sqlite:{}", db_path(temp_dir).display());
    let pool = SqlitePool::connect(&url).await?;
    let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {table}"))
        .fetch_one(&pool)
        .await?;
    let n: i64 = row.get("n");
    pool.close().await;
    Ok(n)
}

/// Test fixture: a batch with a few enrolled students
pub struct Roster;

impl Roster {
    pub async fn create(
        service: &LedgerService,
        batch_name: &str,
        students: &[&str],
    ) -> Result<(Batch, Vec<Student>)> {
        let batch = service.create_batch(batch_name.to_string()).await?;
        let mut enrolled = Vec::with_capacity(students.len());
        for name in students {
            enrolled.push(service.create_student(name.to_string(), batch.id).await?);
        }
        Ok((batch, enrolled))
    }
}
