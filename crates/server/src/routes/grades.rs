use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use service::grades::{Grade, GradePatch, GradeUpdate, NewGrade};
use tracing::info;

use crate::errors::ApiError;
use crate::routes::AppState;

#[derive(Debug, Serialize)]
pub struct StudentTotal {
    pub student: String,
    pub subject: String,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub average: f64,
    pub count: usize,
}

/// List every grade in insertion order
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Grade>>, ApiError> {
    let grades = state.grades.list().await?;
    info!(count = grades.len(), "GET /grades");
    Ok(Json(grades))
}

pub async fn get_one(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Grade>, ApiError> {
    let Path(id) = id?;
    let grade = state
        .grades
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("grade {id} not found")))?;
    info!(id, "GET /grades/:id");
    Ok(Json(grade))
}

/// Create a grade; id and timestamp are assigned by the store
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewGrade>, JsonRejection>,
) -> Result<Json<Grade>, ApiError> {
    let Json(input) = payload?;
    let grade = state.grades.create(input).await?;
    info!(
        id = grade.id,
        student = %grade.student,
        subject = %grade.subject,
        kind = %grade.kind,
        value = grade.value,
        "POST /grades"
    );
    Ok(Json(grade))
}

/// Replace student, subject, type and value of an existing grade
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<GradeUpdate>, JsonRejection>,
) -> Result<Json<Grade>, ApiError> {
    let Json(input) = payload?;
    let grade = state.grades.update(input).await?;
    info!(id = grade.id, student = %grade.student, value = grade.value, "PUT /grades");
    Ok(Json(grade))
}

/// Replace only the value of an existing grade
pub async fn patch_value(
    State(state): State<AppState>,
    payload: Result<Json<GradePatch>, JsonRejection>,
) -> Result<Json<Grade>, ApiError> {
    let Json(input) = payload?;
    let grade = state.grades.patch_value(input).await?;
    info!(id = grade.id, value = grade.value, "PATCH /grades/update");
    Ok(Json(grade))
}

/// Delete a grade; unknown ids succeed as well
pub async fn delete_one(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let removed = state.grades.delete(id).await?;
    info!(id, removed, "DELETE /grades/:id");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn student_total(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<StudentTotal>, ApiError> {
    let Path((student, subject)) = path?;
    let total = state.grades.total_for_student(&student, &subject).await?;
    info!(%student, %subject, total, "GET /grades/student");
    Ok(Json(StudentTotal { student, subject, total }))
}

pub async fn average(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<SubjectAverage>, ApiError> {
    let Path((subject, kind)) = path?;
    let avg = state.grades.average_for(&subject, &kind).await?;
    info!(%subject, %kind, average = avg.average, count = avg.count, "GET /grades/average");
    Ok(Json(SubjectAverage { subject, kind, average: avg.average, count: avg.count }))
}

/// Top three grades for a subject and type, highest first
pub async fn best(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Vec<Grade>>, ApiError> {
    let Path((subject, kind)) = path?;
    let grades = state.grades.best_for(&subject, &kind).await?;
    info!(%subject, %kind, count = grades.len(), "GET /grades/best");
    Ok(Json(grades))
}

pub async fn filter_by_subject_type(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Vec<Grade>>, ApiError> {
    let Path((subject, kind)) = path?;
    let grades = state.grades.filter_by_subject_type(&subject, &kind).await?;
    info!(%subject, %kind, count = grades.len(), "GET /grades/filter");
    Ok(Json(grades))
}

pub async fn filter_by_student_subject(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Vec<Grade>>, ApiError> {
    let Path((student, subject)) = path?;
    let grades = state.grades.filter_by_student_subject(&student, &subject).await?;
    info!(%student, %subject, count = grades.len(), "GET /grades/filter-students");
    Ok(Json(grades))
}
