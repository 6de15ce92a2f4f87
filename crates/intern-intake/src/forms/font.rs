use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::FormError;

/// Characters every form font must carry: one Latin, one Devanagari.
const COVERAGE_SAMPLES: [(char, &str); 2] = [('A', "Latin"), ('न', "Devanagari")];

/// Raw bytes of a multilingual TrueType/OpenType font, checked for the scripts the
/// form prints.
#[derive(Clone)]
pub struct FontAsset {
    path: PathBuf,
    family: Option<String>,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for FontAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontAsset")
            .field("path", &self.path)
            .field("family", &self.family)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl FontAsset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => FormError::FontMissing { path: path.clone() },
            _ => FormError::FontUnreadable {
                path: path.clone(),
                source,
            },
        })?;
        Self::from_bytes(path, bytes)
    }

    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self, FormError> {
        let path = path.into();
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|_| FormError::FontInvalid { path: path.clone() })?;

        for (sample, script) in COVERAGE_SAMPLES {
            if face.glyph_index(sample).is_none() {
                return Err(FormError::FontCoverage { path, script });
            }
        }

        let family = face
            .names()
            .into_iter()
            .filter(|name| name.is_unicode() && name.name_id == ttf_parser::name_id::FULL_NAME)
            .find_map(|name| name.to_string());

        debug!(path = %path.display(), family = ?family, size = bytes.len(), "font loaded");

        Ok(Self {
            path,
            family,
            bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
