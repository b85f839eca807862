use crate::{DbError, RecordStore};
use async_trait::async_trait;
use core_types::{
    ClassRecord, LookupKey, NewRecord, RecordFields, RecordSummary, normalize_section,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// A [`RecordStore`] kept in process memory.
///
/// Mirrors the SQL semantics of [`crate::DbRepository`] closely enough to drive
/// the HTTP layer in tests. [`InMemoryRepository::set_unavailable`] makes every
/// call fail, which stands in for a lost database connection.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
    unavailable: AtomicBool,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    rows: Vec<ClassRecord>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated store faults.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// A snapshot of every stored row, in insertion order.
    pub async fn records(&self) -> Vec<ClassRecord> {
        self.state.read().await.rows.clone()
    }

    /// Stores a row verbatim, bypassing write-path normalization.
    ///
    /// Useful for reproducing rows written by older clients (e.g. `''` sections).
    pub async fn insert_raw(&self, mut record: ClassRecord) -> i64 {
        let mut state = self.state.write().await;
        state.last_id += 1;
        record.id = state.last_id;
        state.rows.push(record);
        state.last_id
    }

    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DbError::Unavailable("in-memory store marked unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRepository {
    async fn list_class_names(&self) -> Result<Vec<String>, DbError> {
        self.check_available()?;
        let state = self.state.read().await;
        let names: BTreeSet<String> = state.rows.iter().map(|r| r.class_name.clone()).collect();
        Ok(names.into_iter().collect())
    }

    async fn list_semesters(&self, class_name: &str) -> Result<Vec<i32>, DbError> {
        self.check_available()?;
        let state = self.state.read().await;
        let semesters: BTreeSet<i32> = state
            .rows
            .iter()
            .filter(|r| r.class_name == class_name)
            .map(|r| r.semester)
            .collect();
        Ok(semesters.into_iter().collect())
    }

    async fn list_sections(&self, class_name: &str, semester: i32) -> Result<Vec<String>, DbError> {
        self.check_available()?;
        let state = self.state.read().await;
        let sections: BTreeSet<String> = state
            .rows
            .iter()
            .filter(|r| r.class_name == class_name && r.semester == semester)
            .filter_map(|r| r.section.clone())
            .filter(|s| !s.trim().is_empty())
            .collect();
        Ok(sections.into_iter().collect())
    }

    async fn find_details(&self, key: &LookupKey) -> Result<Option<ClassRecord>, DbError> {
        self.check_available()?;
        let state = self.state.read().await;
        let found = state
            .rows
            .iter()
            .filter(|r| r.class_name.trim() == key.class_name && r.semester == key.semester)
            .filter(|r| normalize_section(r.section.as_deref()) == key.section)
            .min_by_key(|r| r.id)
            .cloned();
        Ok(found)
    }

    async fn insert_record(&self, record: &NewRecord) -> Result<i64, DbError> {
        self.check_available()?;
        let fields = &record.fields;
        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = state.last_id;
        state.rows.push(ClassRecord {
            id,
            class_name: fields.class_name.clone(),
            semester: fields.semester,
            section: fields.section.clone(),
            academic_year: fields.academic_year.clone(),
            mentor_name: fields.mentor_name.clone(),
            designation: fields.designation.clone(),
            mentor_contact: fields.mentor_contact.clone(),
            timetable_link: fields.timetable_link.clone(),
            syllabus_link: record.syllabus_link.clone(),
            mentor_photo: record.mentor_photo.clone(),
        });
        Ok(id)
    }

    async fn list_summaries(&self) -> Result<Vec<RecordSummary>, DbError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut rows: Vec<RecordSummary> = state.rows.iter().map(RecordSummary::from).collect();
        rows.sort_by(|a, b| {
            a.class_name
                .cmp(&b.class_name)
                .then(a.semester.cmp(&b.semester))
                .then(a.id.cmp(&b.id))
        });
        Ok(rows)
    }

    async fn update_record(&self, id: i64, fields: &RecordFields) -> Result<u64, DbError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let Some(row) = state.rows.iter_mut().find(|r| r.id == id) else {
            return Ok(0);
        };
        row.class_name = fields.class_name.clone();
        row.semester = fields.semester;
        row.section = fields.section.clone();
        row.academic_year = fields.academic_year.clone();
        row.mentor_name = fields.mentor_name.clone();
        row.designation = fields.designation.clone();
        row.mentor_contact = fields.mentor_contact.clone();
        row.timetable_link = fields.timetable_link.clone();
        Ok(1)
    }

    async fn delete_record(&self, id: i64) -> Result<u64, DbError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let before = state.rows.len();
        state.rows.retain(|r| r.id != id);
        Ok((before - state.rows.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(class_name: &str, semester: i32, section: Option<&str>) -> RecordFields {
        RecordFields {
            class_name: class_name.to_string(),
            semester,
            section: section.map(str::to_string),
            academic_year: "2024-25".to_string(),
            mentor_name: "Mentor".to_string(),
            designation: "Professor".to_string(),
            mentor_contact: "555-0100".to_string(),
            timetable_link: None,
        }
    }

    async fn add(
        repo: &InMemoryRepository,
        class_name: &str,
        semester: i32,
        section: Option<&str>,
    ) -> i64 {
        repo.insert_record(&NewRecord {
            fields: fields(class_name, semester, section),
            syllabus_link: None,
            mentor_photo: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn class_names_and_semesters_are_distinct_and_sorted() {
        let repo = InMemoryRepository::new();
        add(&repo, "Physics", 2, None).await;
        add(&repo, "CS101", 3, Some("A")).await;
        add(&repo, "Physics", 1, None).await;
        add(&repo, "Physics", 2, Some("B")).await;

        assert_eq!(repo.list_class_names().await.unwrap(), vec!["CS101", "Physics"]);
        assert_eq!(repo.list_semesters("Physics").await.unwrap(), vec![1, 2]);
        assert!(repo.list_semesters("Chemistry").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_sections_are_hidden_from_listing_but_found_by_details() {
        let repo = InMemoryRepository::new();
        let blank = repo
            .insert_raw(ClassRecord {
                id: 0,
                class_name: "Math".to_string(),
                semester: 1,
                section: Some("  ".to_string()),
                academic_year: String::new(),
                mentor_name: "A".to_string(),
                designation: String::new(),
                mentor_contact: String::new(),
                timetable_link: None,
                syllabus_link: None,
                mentor_photo: None,
            })
            .await;
        add(&repo, "Math", 1, Some("B")).await;

        assert_eq!(repo.list_sections("Math", 1).await.unwrap(), vec!["B"]);

        let found = repo
            .find_details(&LookupKey::new("Math", 1, None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, blank);
    }

    #[tokio::test]
    async fn duplicate_keys_resolve_to_lowest_id() {
        let repo = InMemoryRepository::new();
        let first = add(&repo, "CS101", 3, Some("A")).await;
        add(&repo, "CS101", 3, Some("A")).await;

        let found = repo
            .find_details(&LookupKey::new(" CS101 ", 3, Some("A ")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first);
    }

    #[tokio::test]
    async fn update_and_delete_report_rows_affected() {
        let repo = InMemoryRepository::new();
        let id = add(&repo, "Math", 1, None).await;

        assert_eq!(repo.update_record(id, &fields("Math", 2, Some("C"))).await.unwrap(), 1);
        assert_eq!(repo.update_record(id + 100, &fields("Math", 2, None)).await.unwrap(), 0);
        assert_eq!(repo.records().await[0].semester, 2);

        assert_eq!(repo.delete_record(id).await.unwrap(), 1);
        assert_eq!(repo.delete_record(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let repo = InMemoryRepository::new();
        repo.set_unavailable(true);
        assert!(matches!(repo.list_class_names().await, Err(DbError::Unavailable(_))));
        assert!(matches!(repo.delete_record(1).await, Err(DbError::Unavailable(_))));
    }
}
