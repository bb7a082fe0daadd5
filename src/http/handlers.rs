use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::application::{AppError, LedgerService};
use crate::domain::{Batch, BatchId, NewPayment, Payment, Student, StudentId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub batch_id: BatchId,
}

pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Hello, Chinmudra!" }))
}

pub async fn create_batch(
    State(service): State<LedgerService>,
    Json(request): Json<CreateBatchRequest>,
) -> Result<Json<Batch>, AppError> {
    service.create_batch(request.name).await.map(Json)
}

pub async fn list_batches(
    State(service): State<LedgerService>,
) -> Result<Json<Vec<Batch>>, AppError> {
    service.list_batches().await.map(Json)
}

pub async fn list_batch_students(
    State(service): State<LedgerService>,
    Path(batch_id): Path<BatchId>,
) -> Result<Json<Vec<Student>>, AppError> {
    service.list_students_for_batch(batch_id).await.map(Json)
}

pub async fn create_student(
    State(service): State<LedgerService>,
    Json(request): Json<CreateStudentRequest>,
) -> Result<Json<Student>, AppError> {
    service
        .create_student(request.name, request.batch_id)
        .await
        .map(Json)
}

pub async fn create_payment(
    State(service): State<LedgerService>,
    Json(request): Json<NewPayment>,
) -> Result<Json<Payment>, AppError> {
    service.create_payment(request).await.map(Json)
}

pub async fn list_student_payments(
    State(service): State<LedgerService>,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Vec<Payment>>, AppError> {
    service.list_payments_for_student(student_id).await.map(Json)
}
