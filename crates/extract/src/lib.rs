//! scribe-extract: rule-based extraction of lab values and imaging findings
//! from free clinical text.
//!
//! Every extractor returns [`Extraction`], which serializes to the literal
//! string `"No Data"` when nothing was found and to a JSON array otherwise.

pub mod dates;
pub mod error;
pub mod extraction;
pub mod imaging;
pub mod lab;
pub mod text;

pub use error::ExtractError;
pub use extraction::{Extraction, NO_DATA};
pub use imaging::{
    CombinedFinding, CombinedStudy, Finding, ImagingExtractor, ImagingOrchestrator, Modality,
    Study,
};
pub use lab::{LabExtractor, LabGroup, LabResult};
