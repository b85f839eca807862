//! Runs against a real PostgreSQL instance named by `DATABASE_URL`.
//!
//! `cargo test -p database -- --ignored`

use configuration::DatabaseConfig;
use core_types::{LookupKey, NewRecord, RecordFields};
use database::{DbRepository, RecordStore, connect, run_migrations};
use std::time::{SystemTime, UNIX_EPOCH};

async fn repository() -> DbRepository {
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL").ok(),
        ..Default::default()
    };
    let pool = connect(&config).await.expect("failed to connect");
    run_migrations(&pool).await.expect("failed to migrate");
    DbRepository::new(pool)
}

fn unique_class(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}-{nanos}")
}

fn fields(class_name: &str, semester: i32, section: Option<&str>) -> RecordFields {
    RecordFields {
        class_name: class_name.to_string(),
        semester,
        section: section.map(str::to_string),
        academic_year: "2024-25".to_string(),
        mentor_name: "Mentor".to_string(),
        designation: "Lecturer".to_string(),
        mentor_contact: "555-0100".to_string(),
        timetable_link: None,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn record_lifecycle_against_postgres() {
    let repo = repository().await;
    let class_name = unique_class("Math");

    let id = repo
        .insert_record(&NewRecord {
            fields: fields(&class_name, 1, None),
            syllabus_link: Some("uploads/syllabus/1-a.pdf".to_string()),
            mentor_photo: None,
        })
        .await
        .unwrap();
    repo.insert_record(&NewRecord {
        fields: fields(&class_name, 2, Some("A")),
        syllabus_link: None,
        mentor_photo: None,
    })
    .await
    .unwrap();

    assert!(repo.list_class_names().await.unwrap().contains(&class_name));
    assert_eq!(repo.list_semesters(&class_name).await.unwrap(), vec![1, 2]);
    assert!(repo.list_sections(&class_name, 1).await.unwrap().is_empty());
    assert_eq!(repo.list_sections(&class_name, 2).await.unwrap(), vec!["A"]);

    let found = repo
        .find_details(&LookupKey::new(&format!(" {class_name} "), 1, Some("  ")))
        .await
        .unwrap()
        .expect("record without section should match");
    assert_eq!(found.id, id);
    assert_eq!(found.syllabus_link.as_deref(), Some("uploads/syllabus/1-a.pdf"));

    assert_eq!(repo.update_record(id, &fields(&class_name, 3, None)).await.unwrap(), 1);
    let updated = repo
        .find_details(&LookupKey::new(&class_name, 3, None))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.syllabus_link.as_deref(), Some("uploads/syllabus/1-a.pdf"));

    assert_eq!(repo.delete_record(id).await.unwrap(), 1);
    assert_eq!(repo.delete_record(id).await.unwrap(), 0);
}
