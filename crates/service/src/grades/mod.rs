//! Student grade records: the persisted document, request payloads,
//! read-only aggregations and the repository seam used by the HTTP layer.

pub mod domain;
pub mod numeric;
pub mod query;
pub mod repository;

pub use domain::{Grade, GradeDocument, GradePatch, GradeUpdate, NewGrade};
pub use query::{Average, GradeFilter};
pub use repository::GradeRepository;
