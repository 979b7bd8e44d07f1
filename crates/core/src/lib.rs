//! scribe-core: shared domain types for the clinical note service
//!
//! Record bodies, note types and their prompt templates, the note signing
//! workflow, date helpers, and the JSON envelopes used by the HTTP API.

pub mod capability;
pub mod dates;
pub mod error;
pub mod listing;
pub mod note_type;
pub mod outcome;
pub mod records;
pub mod status;

pub use capability::{Capabilities, NoteTypeInfo, note_type_catalog};
pub use error::CoreError;
pub use listing::Listing;
pub use note_type::NoteType;
pub use outcome::{ErrorCode, ErrorResponse};
pub use records::{Record, RecordKind};
pub use status::NoteStatus;
