use serde::{Deserialize, Serialize};

/// The two kinds of file a record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Syllabus,
    MentorPhoto,
}

impl AttachmentKind {
    pub const ALL: [AttachmentKind; 2] = [AttachmentKind::Syllabus, AttachmentKind::MentorPhoto];

    /// Maps a multipart field name to its attachment kind.
    pub fn from_field_name(name: &str) -> Option<Self> {
        match name {
            "syllabus" => Some(AttachmentKind::Syllabus),
            "mentor_photo" => Some(AttachmentKind::MentorPhoto),
            _ => None,
        }
    }

    /// The multipart field name this kind is uploaded under.
    pub fn field_name(&self) -> &'static str {
        match self {
            AttachmentKind::Syllabus => "syllabus",
            AttachmentKind::MentorPhoto => "mentor_photo",
        }
    }

    /// The directory (below the upload root) files of this kind are stored in.
    pub fn directory(&self) -> &'static str {
        match self {
            AttachmentKind::Syllabus => "syllabus",
            AttachmentKind::MentorPhoto => "mentor_photos",
        }
    }
}
