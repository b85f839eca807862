use crate::{AppState, error::AppError, upload::PendingFile};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use core_types::{AttachmentKind, NewRecord, RecordForm, RecordSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            id: None,
        }
    }
}

/// # POST /api/admin/add
/// Multipart form with the record's text fields plus optional `syllabus` and
/// `mentor_photo` files. The whole form is read and validated before anything
/// touches the disk; if the insert then fails, the stored files are removed.
pub async fn add_record(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let mut form = RecordForm::default();
    let mut pending: Vec<(AttachmentKind, PendingFile)> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(kind) = AttachmentKind::from_field_name(&name) {
            let original_name = field.file_name().map(str::to_string).unwrap_or_default();
            let data = field.bytes().await?;
            // Browsers send an empty part for a file input left blank.
            if original_name.is_empty() && data.is_empty() {
                continue;
            }
            if pending.iter().any(|(k, _)| *k == kind) {
                return Err(AppError::Validation(format!(
                    "Only one file is accepted for '{name}'"
                )));
            }
            pending.push((kind, PendingFile { original_name, data }));
        } else {
            let value = field.text().await?;
            if !form.set_text(&name, value) {
                tracing::debug!(field = %name, "Ignoring unknown form field.");
            }
        }
    }

    let fields = form.into_fields()?;
    let stored = state.uploads.save_all(pending).await?;
    let record = NewRecord {
        fields,
        syllabus_link: stored.public_path(AttachmentKind::Syllabus),
        mentor_photo: stored.public_path(AttachmentKind::MentorPhoto),
    };

    let id = match state.store.insert_record(&record).await {
        Ok(id) => id,
        Err(e) => {
            state.uploads.discard(&stored).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        id,
        class_name = %record.fields.class_name,
        semester = record.fields.semester,
        attachments = stored.files().len(),
        "Record added."
    );
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Record added successfully".to_string(),
            id: Some(id),
        }),
    ))
}

/// # GET /api/admin/records
pub async fn list_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecordSummary>>, AppError> {
    let rows = state.store.list_summaries().await?;
    Ok(Json(rows))
}

/// # PUT /api/admin/update/:id
/// Full replace of the text fields; attachments are never touched.
pub async fn update_record(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<RecordForm>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    let fields = form.into_fields()?;
    let affected = state.store.update_record(id, &fields).await?;
    check_affected(&state, id, affected, "update")?;
    tracing::info!(id, affected, "Record updated.");
    Ok(Json(MessageResponse::new("Record updated successfully")))
}

/// # DELETE /api/admin/delete/:id
/// Attachment files of the deleted record stay on disk.
pub async fn delete_record(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    let affected = state.store.delete_record(id).await?;
    check_affected(&state, id, affected, "delete")?;
    tracing::info!(id, affected, "Record deleted.");
    Ok(Json(MessageResponse::new("Record deleted successfully")))
}

/// Applies the not-found policy to an update or delete that matched no row.
fn check_affected(state: &AppState, id: i64, affected: u64, action: &str) -> Result<(), AppError> {
    if affected > 0 {
        return Ok(());
    }
    if state.strict_not_found {
        return Err(AppError::NotFound(format!("Record {id} not found")));
    }
    tracing::warn!(id, action, "No record matched; reporting success.");
    Ok(())
}
