use async_trait::async_trait;

use crate::errors::ServiceError;
use crate::grades::domain::{Grade, GradePatch, GradeUpdate, NewGrade};
use crate::grades::query::Average;

/// Trait abstraction for grade storage, handed to HTTP handlers as shared state.
/// Every call runs a full load (and, for writes, persist) cycle on the backing document.
#[async_trait]
pub trait GradeRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Grade>, ServiceError>;
    async fn get(&self, id: u64) -> Result<Option<Grade>, ServiceError>;
    async fn create(&self, input: NewGrade) -> Result<Grade, ServiceError>;
    async fn update(&self, input: GradeUpdate) -> Result<Grade, ServiceError>;
    async fn patch_value(&self, input: GradePatch) -> Result<Grade, ServiceError>;
    async fn delete(&self, id: u64) -> Result<bool, ServiceError>;
    async fn total_for_student(&self, student: &str, subject: &str) -> Result<f64, ServiceError>;
    async fn average_for(&self, subject: &str, kind: &str) -> Result<Average, ServiceError>;
    async fn best_for(&self, subject: &str, kind: &str) -> Result<Vec<Grade>, ServiceError>;
    async fn filter_by_subject_type(&self, subject: &str, kind: &str) -> Result<Vec<Grade>, ServiceError>;
    async fn filter_by_student_subject(&self, student: &str, subject: &str) -> Result<Vec<Grade>, ServiceError>;
}
