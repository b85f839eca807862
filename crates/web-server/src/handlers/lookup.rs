//! Read-only endpoints used by the portal's cascading class/semester/section pickers.

use crate::{AppState, error::LookupError};
use axum::{
    Json,
    extract::{Query, State},
};
use core_types::{ClassDetails, LookupKey, parse_semester};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SemestersQuery {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SectionsQuery {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub semester: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub semester: Option<String>,
    pub section: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassNameRow {
    pub class_name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SemesterRow {
    pub semester: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionRow {
    pub section: String,
}

/// # GET /api/classes
pub async fn get_classes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClassNameRow>>, LookupError> {
    let names = state
        .store
        .list_class_names()
        .await
        .map_err(LookupError::List)?;
    Ok(Json(
        names
            .into_iter()
            .map(|class_name| ClassNameRow { class_name })
            .collect(),
    ))
}

/// # GET /api/semesters?class=
pub async fn get_semesters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SemestersQuery>,
) -> Result<Json<Vec<SemesterRow>>, LookupError> {
    let Some(class_name) = query.class_name else {
        return Ok(Json(Vec::new()));
    };
    let semesters = state
        .store
        .list_semesters(&class_name)
        .await
        .map_err(LookupError::List)?;
    Ok(Json(
        semesters
            .into_iter()
            .map(|semester| SemesterRow { semester })
            .collect(),
    ))
}

/// # GET /api/sections?class=&semester=
/// Blank sections are never listed; callers fall back to a details lookup
/// without a section when this comes back empty.
pub async fn get_sections(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SectionsQuery>,
) -> Result<Json<Vec<SectionRow>>, LookupError> {
    let (Some(class_name), Some(semester)) = (
        query.class_name,
        query.semester.as_deref().and_then(parse_semester),
    ) else {
        return Ok(Json(Vec::new()));
    };
    let sections = state
        .store
        .list_sections(&class_name, semester)
        .await
        .map_err(LookupError::List)?;
    Ok(Json(
        sections
            .into_iter()
            .map(|section| SectionRow { section })
            .collect(),
    ))
}

/// # GET /api/details?class=&semester=&section=
/// Answers `null` rather than an error when nothing matches, including when
/// the semester is not a number.
pub async fn get_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetailsQuery>,
) -> Result<Json<Option<ClassDetails>>, LookupError> {
    let Some(class_name) = query.class_name else {
        return Ok(Json(None));
    };
    let Some(semester) = query.semester.as_deref().and_then(parse_semester) else {
        tracing::debug!(semester = ?query.semester, "Non-numeric semester, no match.");
        return Ok(Json(None));
    };

    let key = LookupKey::new(&class_name, semester, query.section.as_deref());
    let record = state
        .store
        .find_details(&key)
        .await
        .map_err(LookupError::Details)?;
    Ok(Json(record.map(ClassDetails::from)))
}
