use crate::error::CoreError;
use crate::normalize::{normalize_optional, normalize_section, parse_semester};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `class_semester_info` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: i64,
    pub class_name: String,
    pub semester: i32,
    pub section: Option<String>,
    pub academic_year: String,
    pub mentor_name: String,
    pub designation: String,
    pub mentor_contact: String,
    pub timetable_link: Option<String>,
    pub syllabus_link: Option<String>,
    pub mentor_photo: Option<String>,
}

/// The summary projection used by the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: i64,
    pub class_name: String,
    pub semester: i32,
    pub section: Option<String>,
    pub mentor_name: String,
    pub designation: String,
}

impl From<&ClassRecord> for RecordSummary {
    fn from(r: &ClassRecord) -> Self {
        Self {
            id: r.id,
            class_name: r.class_name.clone(),
            semester: r.semester,
            section: r.section.clone(),
            mentor_name: r.mentor_name.clone(),
            designation: r.designation.clone(),
        }
    }
}

/// The wire schema of `GET /api/details`.
///
/// Kept separate from [`ClassRecord`] so the storage schema can change
/// without changing what clients see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDetails {
    pub id: i64,
    pub class_name: String,
    pub semester: i32,
    pub section: Option<String>,
    pub academic_year: String,
    pub mentor_name: String,
    pub designation: String,
    pub mentor_contact: String,
    pub timetable_link: Option<String>,
    pub syllabus_link: Option<String>,
    pub mentor_photo: Option<String>,
}

impl From<ClassRecord> for ClassDetails {
    fn from(r: ClassRecord) -> Self {
        Self {
            id: r.id,
            class_name: r.class_name,
            semester: r.semester,
            // Legacy rows may hold '' instead of NULL.
            section: normalize_section(r.section.as_deref()),
            academic_year: r.academic_year,
            mentor_name: r.mentor_name,
            designation: r.designation,
            mentor_contact: r.mentor_contact,
            timetable_link: r.timetable_link,
            syllabus_link: r.syllabus_link,
            mentor_photo: r.mentor_photo,
        }
    }
}

/// The (class name, semester, section) triple that locates one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub class_name: String,
    pub semester: i32,
    pub section: Option<String>,
}

impl LookupKey {
    /// Builds a key from raw query input, trimming the class name and
    /// normalizing the section.
    pub fn new(class_name: &str, semester: i32, section: Option<&str>) -> Self {
        Self {
            class_name: class_name.trim().to_string(),
            semester,
            section: normalize_section(section),
        }
    }
}

/// The editable, validated field set shared by add and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub class_name: String,
    pub semester: i32,
    pub section: Option<String>,
    pub academic_year: String,
    pub mentor_name: String,
    pub designation: String,
    pub mentor_contact: String,
    pub timetable_link: Option<String>,
}

/// A record about to be inserted, with the public paths of its stored files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub fields: RecordFields,
    pub syllabus_link: Option<String>,
    pub mentor_photo: Option<String>,
}

/// A semester as clients send it: either a JSON number or text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SemesterInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SemesterInput {
    pub fn to_semester(&self) -> Option<i32> {
        match self {
            SemesterInput::Integer(n) => i32::try_from(*n).ok(),
            SemesterInput::Float(f) => parse_semester(&f.to_string()),
            SemesterInput::Text(s) => parse_semester(s),
        }
    }
}

/// Unvalidated record fields, as received from a JSON body or a multipart form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordForm {
    pub class_name: Option<String>,
    pub semester: Option<SemesterInput>,
    pub section: Option<String>,
    pub academic_year: Option<String>,
    pub mentor_name: Option<String>,
    pub designation: Option<String>,
    pub mentor_contact: Option<String>,
    pub timetable_link: Option<String>,
}

impl RecordForm {
    /// Sets a text field by its form name. Returns `false` for unknown names.
    pub fn set_text(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "class_name" => &mut self.class_name,
            "semester" => {
                self.semester = Some(SemesterInput::Text(value));
                return true;
            }
            "section" => &mut self.section,
            "academic_year" => &mut self.academic_year,
            "mentor_name" => &mut self.mentor_name,
            "designation" => &mut self.designation,
            "mentor_contact" => &mut self.mentor_contact,
            "timetable_link" => &mut self.timetable_link,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Trims every field, applies defaults and checks the two required ones.
    pub fn into_fields(self) -> Result<RecordFields, CoreError> {
        let class_name = trimmed(self.class_name);
        if class_name.is_empty() {
            return Err(CoreError::InvalidInput(
                "class_name".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let semester = match &self.semester {
            None => {
                return Err(CoreError::InvalidInput(
                    "semester".to_string(),
                    "is required".to_string(),
                ));
            }
            Some(input) => input.to_semester().ok_or_else(|| {
                CoreError::InvalidInput(
                    "semester".to_string(),
                    "must be a whole number".to_string(),
                )
            })?,
        };

        Ok(RecordFields {
            class_name,
            semester,
            section: normalize_section(self.section.as_deref()),
            academic_year: trimmed(self.academic_year),
            mentor_name: trimmed(self.mentor_name),
            designation: trimmed(self.designation),
            mentor_contact: trimmed(self.mentor_contact),
            timetable_link: normalize_optional(self.timetable_link.as_deref()),
        })
    }
}

fn trimmed(value: Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(class_name: &str, semester: SemesterInput) -> RecordForm {
        RecordForm {
            class_name: Some(class_name.to_string()),
            semester: Some(semester),
            ..Default::default()
        }
    }

    #[test]
    fn into_fields_trims_and_defaults() {
        let mut f = form("  CS101 ", SemesterInput::Text(" 3 ".to_string()));
        f.section = Some("   ".to_string());
        f.mentor_name = Some(" Dr. Rao ".to_string());
        f.timetable_link = Some("".to_string());

        let fields = f.into_fields().unwrap();
        assert_eq!(fields.class_name, "CS101");
        assert_eq!(fields.semester, 3);
        assert_eq!(fields.section, None);
        assert_eq!(fields.mentor_name, "Dr. Rao");
        assert_eq!(fields.academic_year, "");
        assert_eq!(fields.timetable_link, None);
    }

    #[test]
    fn into_fields_rejects_missing_class_and_bad_semester() {
        let err = form("   ", SemesterInput::Integer(1)).into_fields().unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ref field, _) if field == "class_name"));

        let err = form("Math", SemesterInput::Text("first".to_string()))
            .into_fields()
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ref field, _) if field == "semester"));

        let err = RecordForm {
            class_name: Some("Math".to_string()),
            ..Default::default()
        }
        .into_fields()
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ref field, _) if field == "semester"));
    }

    #[test]
    fn semester_accepts_json_numbers_and_strings() {
        let f: RecordForm = serde_json::from_str(r#"{"class_name":"Math","semester":2}"#).unwrap();
        assert_eq!(f.into_fields().unwrap().semester, 2);

        let f: RecordForm =
            serde_json::from_str(r#"{"class_name":"Math","semester":"4"}"#).unwrap();
        assert_eq!(f.into_fields().unwrap().semester, 4);

        let f: RecordForm =
            serde_json::from_str(r#"{"class_name":"Math","semester":6.0}"#).unwrap();
        assert_eq!(f.into_fields().unwrap().semester, 6);
    }

    #[test]
    fn set_text_ignores_unknown_fields() {
        let mut f = RecordForm::default();
        assert!(f.set_text("designation", "Professor".to_string()));
        assert!(f.set_text("semester", "1".to_string()));
        assert!(!f.set_text("unexpected", "x".to_string()));
        assert_eq!(f.designation.as_deref(), Some("Professor"));
        assert_eq!(f.semester, Some(SemesterInput::Text("1".to_string())));
    }

    #[test]
    fn lookup_key_and_details_normalize_sections() {
        let key = LookupKey::new(" CS101 ", 3, Some(" A "));
        assert_eq!(key.class_name, "CS101");
        assert_eq!(key.section.as_deref(), Some("A"));

        let record = ClassRecord {
            id: 1,
            class_name: "Math".to_string(),
            semester: 1,
            section: Some("".to_string()),
            academic_year: "2024-25".to_string(),
            mentor_name: "A".to_string(),
            designation: String::new(),
            mentor_contact: String::new(),
            timetable_link: None,
            syllabus_link: None,
            mentor_photo: None,
        };
        assert_eq!(ClassDetails::from(record).section, None);
    }
}
