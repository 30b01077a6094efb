use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::grades::numeric;

/// One scored assessment for a student in a subject.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Grade {
    pub id: u64,
    pub student: String,
    pub subject: String,
    /// Assessment category, e.g. `exam` or `assignment`. Stored as `type`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "numeric::score")]
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// The whole persisted state: the id counter plus every grade in insertion order.
///
/// Invariant: every `grades[i].id` is unique and strictly below `next_id`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeDocument {
    pub next_id: u64,
    #[serde(default)]
    pub grades: Vec<Grade>,
}

impl Default for GradeDocument {
    fn default() -> Self {
        Self { next_id: 1, grades: Vec::new() }
    }
}

impl GradeDocument {
    /// Allocate the next id, stamp the record and append it.
    ///
    /// Fails without touching the document once the id counter is exhausted.
    pub fn insert(&mut self, input: NewGrade, now: DateTime<Utc>) -> Result<Grade, ServiceError> {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .ok_or_else(|| ServiceError::CorruptDocument(format!("id counter exhausted at nextId {id}")))?;
        let grade = Grade {
            id,
            student: input.student,
            subject: input.subject,
            kind: input.kind,
            value: input.value,
            timestamp: now,
        };
        self.grades.push(grade.clone());
        Ok(grade)
    }

    pub fn find(&self, id: u64) -> Option<&Grade> {
        self.grades.iter().find(|g| g.id == id)
    }

    pub fn find_mut(&mut self, id: u64) -> Result<&mut Grade, ServiceError> {
        self.grades
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(ServiceError::RecordNotFound(id))
    }

    /// Drop every grade with `id`; returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.grades.len();
        self.grades.retain(|g| g.id != id);
        self.grades.len() != before
    }
}

/// Create payload. `id` and `timestamp` are assigned by the store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewGrade {
    pub student: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "numeric::score")]
    pub value: f64,
}

/// Full update payload: replaces student, subject, type and value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GradeUpdate {
    #[serde(default, deserialize_with = "numeric::optional_id")]
    pub id: Option<u64>,
    pub student: String,
    pub subject: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "numeric::score")]
    pub value: f64,
}

/// Value-only update payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GradePatch {
    #[serde(default, deserialize_with = "numeric::optional_id")]
    pub id: Option<u64>,
    #[serde(deserialize_with = "numeric::score")]
    pub value: f64,
}

/// Ids start at 1, so `0` is treated like an absent id.
fn required_id(id: Option<u64>) -> Result<u64, ServiceError> {
    id.filter(|&id| id != 0).ok_or(ServiceError::MissingIdentifier)
}

impl GradeUpdate {
    pub fn require_id(&self) -> Result<u64, ServiceError> {
        required_id(self.id)
    }

    /// Overwrite the mutable fields of `grade`; id and timestamp stay as stored.
    pub fn apply(self, grade: &mut Grade) {
        grade.student = self.student;
        grade.subject = self.subject;
        grade.kind = self.kind;
        grade.value = self.value;
    }
}

impl GradePatch {
    pub fn require_id(&self) -> Result<u64, ServiceError> {
        required_id(self.id)
    }
}
