//! Service layer for the grades API.
//! - Owns the persisted grade document and its read-modify-write protocol.
//! - Keeps aggregation logic pure and separate from storage.
//! - Exposes the `GradeRepository` seam consumed by the HTTP layer.

pub mod errors;
pub mod storage;
pub mod grades;
pub mod file;
