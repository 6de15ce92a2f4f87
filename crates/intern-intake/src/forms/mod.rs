//! Bilingual (Hindi/English) internship application form generator.
//!
//! The form is drawn from scratch onto a single A4 page. A fixed layout table positions every
//! label, underline and data slot, and the bilingual formatter turns raw applicant values into
//! display strings. Each string is shaped into positioned glyphs before the assembler embeds one
//! multilingual font and serializes the page.

pub mod assembler;
pub mod bilingual;
pub mod font;
pub mod layout;
pub mod renderer;
pub mod shaping;

use std::path::PathBuf;

pub use assembler::{FormAssembler, APPLICATION_FORM_TITLE};
pub use bilingual::{
    format_age, format_applicant_data, format_category, format_gender, ApplicantFormData,
    FormattedFieldSet,
};
pub use font::FontAsset;
pub use layout::{Column, FieldSlot, FormField, FormLayout, FormSection, PagePoint};
pub use renderer::{render_form, FormCanvas, FormRenderer, InkColor};
pub use shaping::{ShapedGlyph, ShapedText, TextShaper};

/// Failures raised while producing an application form.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("font file not found: {}", path.display())]
    FontMissing { path: PathBuf },
    #[error("unable to read font file {}: {source}", path.display())]
    FontUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font file {} is not a usable TrueType/OpenType face", path.display())]
    FontInvalid { path: PathBuf },
    #[error("font file {} has no glyph for {script} text", path.display())]
    FontCoverage { path: PathBuf, script: &'static str },
    #[error("unable to embed font: {0}")]
    FontEmbedding(String),
    #[error("field {field:?} is placed outside the page at ({x}, {y})")]
    OutOfBounds { field: FormField, x: f32, y: f32 },
    #[error("unable to serialize form document: {0}")]
    Serialization(String),
}
