use crate::DbError;
use async_trait::async_trait;
use core_types::{ClassRecord, LookupKey, NewRecord, RecordFields, RecordSummary};
use sqlx::postgres::PgPool;

/// Data access for the `class_semester_info` table.
///
/// Every method maps to exactly one SQL statement. Update and delete report
/// how many rows they touched and leave the "not found" policy to the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Distinct class names, ascending.
    async fn list_class_names(&self) -> Result<Vec<String>, DbError>;

    /// Distinct semesters of one class, ascending.
    async fn list_semesters(&self, class_name: &str) -> Result<Vec<i32>, DbError>;

    /// Distinct non-blank sections of one class and semester, ascending.
    async fn list_sections(&self, class_name: &str, semester: i32) -> Result<Vec<String>, DbError>;

    /// The lowest-id record matching the lookup key.
    ///
    /// A `None` section matches rows whose section is NULL or blank.
    async fn find_details(&self, key: &LookupKey) -> Result<Option<ClassRecord>, DbError>;

    /// Inserts a record and returns its generated id.
    async fn insert_record(&self, record: &NewRecord) -> Result<i64, DbError>;

    /// Summary rows ordered by class name, semester, then id.
    async fn list_summaries(&self) -> Result<Vec<RecordSummary>, DbError>;

    /// Overwrites every non-attachment field. Returns the rows affected.
    async fn update_record(&self, id: i64, fields: &RecordFields) -> Result<u64, DbError>;

    /// Returns the rows affected.
    async fn delete_record(&self, id: i64) -> Result<u64, DbError>;
}

/// The PostgreSQL-backed [`RecordStore`].
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for DbRepository {
    async fn list_class_names(&self) -> Result<Vec<String>, DbError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT class_name FROM class_semester_info ORDER BY class_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn list_semesters(&self, class_name: &str) -> Result<Vec<i32>, DbError> {
        let semesters = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT DISTINCT semester
            FROM class_semester_info
            WHERE class_name = $1
            ORDER BY semester ASC
            "#,
        )
        .bind(class_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(semesters)
    }

    async fn list_sections(&self, class_name: &str, semester: i32) -> Result<Vec<String>, DbError> {
        let sections = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT section
            FROM class_semester_info
            WHERE class_name = $1
              AND semester = $2
              AND section IS NOT NULL
              AND TRIM(section) <> ''
            ORDER BY section ASC
            "#,
        )
        .bind(class_name)
        .bind(semester)
        .fetch_all(&self.pool)
        .await?;
        Ok(sections)
    }

    async fn find_details(&self, key: &LookupKey) -> Result<Option<ClassRecord>, DbError> {
        let record = sqlx::query_as::<_, ClassRecord>(
            r#"
            SELECT id, class_name, semester, section, academic_year, mentor_name,
                   designation, mentor_contact, timetable_link, syllabus_link, mentor_photo
            FROM class_semester_info
            WHERE TRIM(class_name) = $1
              AND semester = $2
              AND (
                    ($3::TEXT IS NULL AND COALESCE(TRIM(section), '') = '')
                 OR TRIM(section) = $3
              )
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(&key.class_name)
        .bind(key.semester)
        .bind(key.section.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn insert_record(&self, record: &NewRecord) -> Result<i64, DbError> {
        let fields = &record.fields;
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO class_semester_info
                (class_name, semester, section, academic_year, mentor_name, designation,
                 mentor_contact, timetable_link, syllabus_link, mentor_photo)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&fields.class_name)
        .bind(fields.semester)
        .bind(fields.section.as_deref())
        .bind(&fields.academic_year)
        .bind(&fields.mentor_name)
        .bind(&fields.designation)
        .bind(&fields.mentor_contact)
        .bind(fields.timetable_link.as_deref())
        .bind(record.syllabus_link.as_deref())
        .bind(record.mentor_photo.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list_summaries(&self) -> Result<Vec<RecordSummary>, DbError> {
        let rows = sqlx::query_as::<_, RecordSummary>(
            r#"
            SELECT id, class_name, semester, section, mentor_name, designation
            FROM class_semester_info
            ORDER BY class_name ASC, semester ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_record(&self, id: i64, fields: &RecordFields) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE class_semester_info
            SET class_name = $1, semester = $2, section = $3, academic_year = $4,
                mentor_name = $5, designation = $6, mentor_contact = $7, timetable_link = $8
            WHERE id = $9
            "#,
        )
        .bind(&fields.class_name)
        .bind(fields.semester)
        .bind(fields.section.as_deref())
        .bind(&fields.academic_year)
        .bind(&fields.mentor_name)
        .bind(&fields.designation)
        .bind(&fields.mentor_contact)
        .bind(fields.timetable_link.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_record(&self, id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM class_semester_info WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
