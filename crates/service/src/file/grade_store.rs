use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use tracing::debug;

use crate::errors::ServiceError;
use crate::grades::domain::{Grade, GradeDocument, GradePatch, GradeUpdate, NewGrade};
use crate::grades::query::{self, Average, GradeFilter, BEST_LIMIT};
use crate::grades::repository::GradeRepository;
use crate::storage::json_document_store::JsonDocumentStore;

/// File storage: the grade document persisted as one JSON file.
pub struct GradeStore {
    doc: JsonDocumentStore<GradeDocument>,
}

impl GradeStore {
    /// Build a store over `path`. Does no I/O; call [`GradeStore::bootstrap`] at startup.
    pub fn new<P: Into<PathBuf>>(path: P) -> Arc<Self> {
        Arc::new(Self { doc: JsonDocumentStore::new(path) })
    }

    /// Create an empty document (`nextId = 1`, no grades) if none exists yet.
    pub async fn bootstrap(&self) -> Result<bool, ServiceError> {
        self.doc.bootstrap().await
    }

    pub fn path(&self) -> &std::path::Path {
        self.doc.path()
    }

    pub async fn load(&self) -> Result<GradeDocument, ServiceError> {
        self.doc.load().await
    }

    pub async fn save(&self, doc: &GradeDocument) -> Result<(), ServiceError> {
        self.doc.save(doc).await
    }

    pub async fn list(&self) -> Result<Vec<Grade>, ServiceError> {
        Ok(self.load().await?.grades)
    }

    /// First grade with `id`, or `None` if absent.
    pub async fn get(&self, id: u64) -> Result<Option<Grade>, ServiceError> {
        self.doc.view(|d| Ok(d.find(id).cloned())).await
    }

    pub async fn create(&self, input: NewGrade) -> Result<Grade, ServiceError> {
        let grade = self.doc.update(|d| d.insert(input, Utc::now())).await?;
        debug!(id = grade.id, "grade created");
        Ok(grade)
    }

    /// Replace student, subject, type and value; returns the stored record.
    pub async fn update(&self, input: GradeUpdate) -> Result<Grade, ServiceError> {
        let id = input.require_id()?;
        self.doc
            .update(|d| {
                let grade = d.find_mut(id)?;
                input.apply(grade);
                Ok(grade.clone())
            })
            .await
    }

    /// Replace only the value; returns the stored record.
    pub async fn patch_value(&self, input: GradePatch) -> Result<Grade, ServiceError> {
        let id = input.require_id()?;
        self.doc
            .update(|d| {
                let grade = d.find_mut(id)?;
                grade.value = input.value;
                Ok(grade.clone())
            })
            .await
    }

    /// Remove the grade with `id`. The document is rewritten even when nothing matched.
    pub async fn delete(&self, id: u64) -> Result<bool, ServiceError> {
        let removed = self.doc.update(|d| Ok(d.remove(id))).await?;
        debug!(id, removed, "grade delete applied");
        Ok(removed)
    }

    pub async fn total_for_student(&self, student: &str, subject: &str) -> Result<f64, ServiceError> {
        let by = GradeFilter::StudentSubject { student, subject };
        self.doc.view(|d| Ok(query::total(&d.grades, by))).await
    }

    pub async fn average_for(&self, subject: &str, kind: &str) -> Result<Average, ServiceError> {
        let by = GradeFilter::SubjectType { subject, kind };
        self.doc
            .view(|d| query::average(&d.grades, by).ok_or_else(|| ServiceError::NoMatchingRecords(by.to_string())))
            .await
    }

    pub async fn best_for(&self, subject: &str, kind: &str) -> Result<Vec<Grade>, ServiceError> {
        let by = GradeFilter::SubjectType { subject, kind };
        self.doc.view(|d| Ok(query::best(&d.grades, by, BEST_LIMIT))).await
    }

    pub async fn filter_by_subject_type(&self, subject: &str, kind: &str) -> Result<Vec<Grade>, ServiceError> {
        let by = GradeFilter::SubjectType { subject, kind };
        self.doc.view(|d| Ok(query::filter(&d.grades, by))).await
    }

    pub async fn filter_by_student_subject(&self, student: &str, subject: &str) -> Result<Vec<Grade>, ServiceError> {
        let by = GradeFilter::StudentSubject { student, subject };
        self.doc.view(|d| Ok(query::filter(&d.grades, by))).await
    }
}

#[async_trait::async_trait]
impl GradeRepository for GradeStore {
    async fn list(&self) -> Result<Vec<Grade>, ServiceError> { self.list().await }
    async fn get(&self, id: u64) -> Result<Option<Grade>, ServiceError> { self.get(id).await }
    async fn create(&self, input: NewGrade) -> Result<Grade, ServiceError> { self.create(input).await }
    async fn update(&self, input: GradeUpdate) -> Result<Grade, ServiceError> { self.update(input).await }
    async fn patch_value(&self, input: GradePatch) -> Result<Grade, ServiceError> { self.patch_value(input).await }
    async fn delete(&self, id: u64) -> Result<bool, ServiceError> { self.delete(id).await }
    async fn total_for_student(&self, student: &str, subject: &str) -> Result<f64, ServiceError> {
        self.total_for_student(student, subject).await
    }
    async fn average_for(&self, subject: &str, kind: &str) -> Result<Average, ServiceError> {
        self.average_for(subject, kind).await
    }
    async fn best_for(&self, subject: &str, kind: &str) -> Result<Vec<Grade>, ServiceError> {
        self.best_for(subject, kind).await
    }
    async fn filter_by_subject_type(&self, subject: &str, kind: &str) -> Result<Vec<Grade>, ServiceError> {
        self.filter_by_subject_type(subject, kind).await
    }
    async fn filter_by_student_subject(&self, student: &str, subject: &str) -> Result<Vec<Grade>, ServiceError> {
        self.filter_by_student_subject(student, subject).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn setup_store() -> Result<Arc<GradeStore>, anyhow::Error> {
        let path = std::env::temp_dir().join(format!("svc_grades_{}", Uuid::new_v4())).join("grades.json");
        let store = GradeStore::new(path);
        store.bootstrap().await?;
        Ok(store)
    }

    async fn cleanup(store: &GradeStore) {
        if let Some(dir) = store.path().parent() {
            let _ = tokio::fs::remove_dir_all(dir).await;
        }
    }

    fn input(student: &str, subject: &str, kind: &str, value: f64) -> NewGrade {
        NewGrade { student: student.into(), subject: subject.into(), kind: kind.into(), value }
    }

    #[tokio::test]
    async fn create_allocates_ids_and_persists_counter() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        for expected in 1..=4u64 {
            let g = store.create(input("Alice", "Math", "exam", expected as f64)).await?;
            assert_eq!(g.id, expected);
        }
        let doc = store.load().await?;
        assert_eq!(doc.next_id, 5);
        assert_eq!(doc.grades.iter().map(|g| g.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);

        // a fresh handle on the same file keeps counting
        let reopened = GradeStore::new(store.path());
        assert!(!reopened.bootstrap().await?);
        assert_eq!(reopened.create(input("Bob", "Math", "exam", 1.0)).await?.id, 5);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn saved_document_is_what_load_returns() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        store.create(input("Alice", "Math", "exam", 4.0)).await?;

        let mut doc = store.load().await?;
        doc.grades[0].value = 9.0;
        doc.insert(input("Bob", "Art", "quiz", 2.0), Utc::now())?;
        store.save(&doc).await?;

        assert_eq!(store.load().await?, doc);
        assert_eq!(store.get(2).await?.map(|g| g.student), Some("Bob".to_string()));
        assert_eq!(store.create(input("Carol", "Math", "exam", 1.0)).await?.id, 3);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn create_fails_when_id_counter_is_exhausted() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        store.save(&GradeDocument { next_id: u64::MAX, grades: Vec::new() }).await?;
        let before = tokio::fs::read(store.path()).await?;

        let res = store.create(input("Alice", "Math", "exam", 1.0)).await;
        assert!(matches!(res, Err(ServiceError::CorruptDocument(_))));
        assert_eq!(tokio::fs::read(store.path()).await?, before);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn create_then_get_round_trips() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        let created = store.create(input("Alice", "Math", "exam", 7.5)).await?;
        let found = store.get(created.id).await?.expect("stored grade");
        assert_eq!(found, created);
        assert_eq!(store.get(999).await?, None);

        let listed = store.list().await?;
        assert_eq!(listed.iter().filter(|g| g.id == created.id).count(), 1);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_overwrites_fields_but_not_identity() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        let created = store.create(input("Alice", "Math", "exam", 5.0)).await?;
        let updated = store
            .update(GradeUpdate {
                id: Some(created.id),
                student: "Bob".into(),
                subject: "Physics".into(),
                kind: "quiz".into(),
                value: 9.0,
            })
            .await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.timestamp, created.timestamp);
        assert_eq!(store.get(created.id).await?, Some(updated));

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_errors_for_missing_or_unknown_id() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        store.create(input("Alice", "Math", "exam", 5.0)).await?;
        let before = tokio::fs::read(store.path()).await?;

        let upd = |id| GradeUpdate {
            id,
            student: "x".into(),
            subject: "y".into(),
            kind: "z".into(),
            value: 1.0,
        };
        assert!(matches!(store.update(upd(None)).await, Err(ServiceError::MissingIdentifier)));
        assert!(matches!(store.update(upd(Some(42))).await, Err(ServiceError::RecordNotFound(42))));
        assert!(matches!(
            store.patch_value(GradePatch { id: None, value: 1.0 }).await,
            Err(ServiceError::MissingIdentifier)
        ));
        assert!(matches!(
            store.patch_value(GradePatch { id: Some(42), value: 1.0 }).await,
            Err(ServiceError::RecordNotFound(42))
        ));
        assert_eq!(tokio::fs::read(store.path()).await?, before);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn patch_changes_only_value() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        let created = store.create(input("Alice", "Math", "exam", 5.0)).await?;
        let patched = store.patch_value(GradePatch { id: Some(created.id), value: 8.25 }).await?;
        assert_eq!(patched.value, 8.25);
        assert_eq!(
            (patched.student.as_str(), patched.subject.as_str(), patched.kind.as_str(), patched.timestamp),
            ("Alice", "Math", "exam", created.timestamp)
        );
        assert_eq!(store.get(created.id).await?, Some(patched));

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_unknown_id_is_a_noop() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        let a = store.create(input("Alice", "Math", "exam", 5.0)).await?;
        let b = store.create(input("Bob", "Math", "exam", 6.0)).await?;

        assert!(!store.delete(77).await?);
        assert_eq!(store.list().await?, vec![a.clone(), b.clone()]);

        assert!(store.delete(a.id).await?);
        assert_eq!(store.list().await?, vec![b]);
        assert_eq!(store.load().await?.next_id, 3);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn aggregations_read_without_mutating() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        store.create(input("Alice", "Math", "exam", 10.0)).await?;
        store.create(input("Alice", "Math", "assignment", 3.0)).await?;
        store.create(input("Bob", "Math", "exam", 6.0)).await?;
        store.create(input("Bob", "Art", "exam", 2.0)).await?;
        let before = tokio::fs::read(store.path()).await?;

        assert_eq!(store.total_for_student("Alice", "Math").await?, 13.0);
        assert_eq!(store.total_for_student("Carol", "Math").await?, 0.0);

        let avg = store.average_for("Math", "exam").await?;
        assert_eq!((avg.average, avg.count), (8.0, 2));
        assert!(matches!(store.average_for("Math", "quiz").await, Err(ServiceError::NoMatchingRecords(_))));

        let best: Vec<u64> = store.best_for("Math", "exam").await?.iter().map(|g| g.id).collect();
        assert_eq!(best, vec![1, 3]);

        let ids: Vec<u64> = store.filter_by_subject_type("Math", "exam").await?.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 3]);
        let ids: Vec<u64> = store.filter_by_student_subject("Alice", "Math").await?.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2]);

        assert_eq!(tokio::fs::read(store.path()).await?, before);

        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() -> Result<(), anyhow::Error> {
        let store = setup_store().await?;
        let repo: Arc<dyn GradeRepository> = store.clone();

        let mut tasks = Vec::new();
        for i in 0..20 {
            let repo = Arc::clone(&repo);
            tasks.push(tokio::spawn(async move {
                repo.create(NewGrade {
                    student: format!("s{i}"),
                    subject: "Math".into(),
                    kind: "exam".into(),
                    value: i as f64,
                })
                .await
            }));
        }
        let mut ids = Vec::new();
        for t in tasks {
            ids.push(t.await??.id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
        assert_eq!(store.list().await?.len(), 20);

        cleanup(&store).await;
        Ok(())
    }
}
