use thiserror::Error;

use crate::domain::{BatchId, StudentId};

/// Coarse classification of [`AppError`], used by front-ends to pick a
/// status code or exit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A unique key is already taken
    Conflict,
    /// A referenced parent entity does not exist
    NotFound,
    /// Anything the caller cannot fix
    Internal,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Batch already exists")]
    BatchAlreadyExists(String),

    #[error("Batch not found")]
    BatchNotFound(BatchId),

    #[error("Student not found")]
    StudentNotFound(StudentId),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::BatchAlreadyExists(_) => ErrorKind::Conflict,
            AppError::BatchNotFound(_) | AppError::StudentNotFound(_) => ErrorKind::NotFound,
            AppError::Database(_) => ErrorKind::Internal,
        }
    }
}
