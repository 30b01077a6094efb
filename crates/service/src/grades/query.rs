//! Read-only derivations over a slice of grades. Nothing here touches storage.

use serde::Serialize;

use crate::grades::domain::Grade;

/// Number of records returned by the ranking query.
pub const BEST_LIMIT: usize = 3;

/// Equality predicate over two of a grade's descriptive fields.
#[derive(Clone, Copy, Debug)]
pub enum GradeFilter<'a> {
    StudentSubject { student: &'a str, subject: &'a str },
    SubjectType { subject: &'a str, kind: &'a str },
}

impl GradeFilter<'_> {
    pub fn matches(&self, grade: &Grade) -> bool {
        match *self {
            Self::StudentSubject { student, subject } => grade.student == student && grade.subject == subject,
            Self::SubjectType { subject, kind } => grade.subject == subject && grade.kind == kind,
        }
    }
}

impl std::fmt::Display for GradeFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentSubject { student, subject } => write!(f, "student `{student}` in `{subject}`"),
            Self::SubjectType { subject, kind } => write!(f, "`{subject}` / `{kind}`"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Average {
    pub average: f64,
    pub count: usize,
}

pub fn filter(grades: &[Grade], by: GradeFilter<'_>) -> Vec<Grade> {
    grades.iter().filter(|g| by.matches(g)).cloned().collect()
}

/// Sum of matching values; an empty match set sums to zero.
pub fn total(grades: &[Grade], by: GradeFilter<'_>) -> f64 {
    grades.iter().filter(|g| by.matches(g)).map(|g| g.value).sum()
}

/// Mean of matching values, `None` when nothing matches.
pub fn average(grades: &[Grade], by: GradeFilter<'_>) -> Option<Average> {
    let (sum, count) = grades
        .iter()
        .filter(|g| by.matches(g))
        .fold((0.0, 0usize), |(s, c), g| (s + g.value, c + 1));
    (count > 0).then(|| Average { average: sum / count as f64, count })
}

/// Highest `limit` matching grades, descending by value. Equal values keep scan order.
pub fn best(grades: &[Grade], by: GradeFilter<'_>, limit: usize) -> Vec<Grade> {
    let mut ranked = filter(grades, by);
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn grade(id: u64, student: &str, subject: &str, kind: &str, value: f64) -> Grade {
        Grade {
            id,
            student: student.into(),
            subject: subject.into(),
            kind: kind.into(),
            value,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn total_sums_student_subject_matches() {
        let grades = vec![
            grade(1, "Alice", "Math", "exam", 5.0),
            grade(2, "Alice", "Math", "assignment", 3.0),
            grade(3, "Bob", "Math", "exam", 10.0),
        ];
        let by = GradeFilter::StudentSubject { student: "Alice", subject: "Math" };
        assert_eq!(total(&grades, by), 8.0);
    }

    #[test]
    fn total_of_nothing_is_zero() {
        let grades = vec![grade(1, "Bob", "Math", "exam", 10.0)];
        let by = GradeFilter::StudentSubject { student: "Alice", subject: "Math" };
        assert_eq!(total(&grades, by), 0.0);
        assert_eq!(total(&[], by), 0.0);
    }

    #[test]
    fn average_divides_by_match_count() {
        let grades = vec![
            grade(1, "Alice", "Math", "exam", 10.0),
            grade(2, "Bob", "Math", "exam", 6.0),
            grade(3, "Bob", "Math", "quiz", 100.0),
        ];
        let by = GradeFilter::SubjectType { subject: "Math", kind: "exam" };
        assert_eq!(average(&grades, by), Some(Average { average: 8.0, count: 2 }));
    }

    #[test]
    fn average_of_nothing_is_none() {
        let grades = vec![grade(1, "Alice", "Math", "quiz", 10.0)];
        assert_eq!(average(&grades, GradeFilter::SubjectType { subject: "Math", kind: "exam" }), None);
    }

    #[test]
    fn best_ranks_descending_with_stable_ties() {
        let grades: Vec<Grade> = [9.0, 2.0, 7.0, 9.0, 5.0]
            .iter()
            .enumerate()
            .map(|(i, v)| grade(i as u64 + 1, "s", "Math", "exam", *v))
            .collect();
        let top = best(&grades, GradeFilter::SubjectType { subject: "Math", kind: "exam" }, BEST_LIMIT);
        let values: Vec<f64> = top.iter().map(|g| g.value).collect();
        let ids: Vec<u64> = top.iter().map(|g| g.id).collect();
        assert_eq!(values, vec![9.0, 9.0, 7.0]);
        assert_eq!(ids, vec![1, 4, 3]);
    }

    #[test]
    fn best_returns_fewer_when_few_match() {
        let grades = vec![
            grade(1, "a", "Math", "exam", 4.0),
            grade(2, "b", "Art", "exam", 9.0),
        ];
        let top = best(&grades, GradeFilter::SubjectType { subject: "Math", kind: "exam" }, BEST_LIMIT);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, 1);
    }

    #[test]
    fn filter_preserves_insertion_order() {
        let grades = vec![
            grade(1, "Alice", "Math", "exam", 1.0),
            grade(2, "Bob", "Math", "exam", 9.0),
            grade(3, "Alice", "Math", "quiz", 5.0),
            grade(4, "Alice", "Art", "exam", 7.0),
        ];
        let ids: Vec<u64> = filter(&grades, GradeFilter::SubjectType { subject: "Math", kind: "exam" })
            .iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);

        let ids: Vec<u64> = filter(&grades, GradeFilter::StudentSubject { student: "Alice", subject: "Math" })
            .iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
