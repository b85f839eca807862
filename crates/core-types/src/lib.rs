pub mod enums;
pub mod error;
pub mod normalize;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::AttachmentKind;
pub use error::CoreError;
pub use normalize::{normalize_optional, normalize_section, parse_semester};
pub use structs::{
    ClassDetails, ClassRecord, LookupKey, NewRecord, RecordFields, RecordForm, RecordSummary,
    SemesterInput,
};
