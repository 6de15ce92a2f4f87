//! Glyph shaping for form text.
//!
//! Devanagari cannot be printed one codepoint at a time: pre-base vowel signs move in front of
//! their consonant and marks stack on it. Every string is run through rustybuzz and handed to the
//! page as glyph ids with TJ adjustments.

use rustybuzz::ttf_parser::GlyphId;
use rustybuzz::{Face, UnicodeBuffer};

use super::font::FontAsset;
use super::FormError;

/// Widths are expressed in thousandths of an em inside PDF text space.
const TEXT_SPACE_UNITS: f32 = 1000.0;

/// One glyph of a shaped run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub glyph_id: u16,
    /// Shift applied before the glyph, in TJ units (positive moves left).
    pub adjustment: i64,
}

/// Shaped glyph run in visual order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapedText {
    glyphs: Vec<ShapedGlyph>,
}

impl ShapedText {
    pub fn glyphs(&self) -> &[ShapedGlyph] {
        &self.glyphs
    }

    pub fn glyph_ids(&self) -> Vec<u16> {
        self.glyphs.iter().map(|glyph| glyph.glyph_id).collect()
    }

    /// `(adjustment, glyph id)` pairs in the shape printpdf's positioned writer takes.
    pub fn positioned(&self) -> impl Iterator<Item = (i64, u16)> + '_ {
        self.glyphs
            .iter()
            .map(|glyph| (glyph.adjustment, glyph.glyph_id))
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Shapes text against the embedded form font.
pub struct TextShaper<'a> {
    face: Face<'a>,
    scale: f32,
}

impl std::fmt::Debug for TextShaper<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextShaper")
            .field("units_per_em", &self.face.units_per_em())
            .finish()
    }
}

impl<'a> TextShaper<'a> {
    pub fn new(font: &'a FontAsset) -> Result<Self, FormError> {
        let face = Face::from_slice(font.bytes(), 0).ok_or_else(|| FormError::FontInvalid {
            path: font.path().to_path_buf(),
        })?;
        let scale = TEXT_SPACE_UNITS / (face.units_per_em().max(1) as f32);
        Ok(Self { face, scale })
    }

    pub fn shape(&self, text: &str) -> ShapedText {
        if text.is_empty() {
            return ShapedText::default();
        }

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();
        let output = rustybuzz::shape(&self.face, &[], buffer);

        let mut glyphs = Vec::with_capacity(output.len());
        // The PDF viewer advances by the font's own width; whatever the shaper wants on top of
        // that is carried into the next glyph's adjustment.
        let mut carried = 0_i64;
        for (info, position) in output.glyph_infos().iter().zip(output.glyph_positions()) {
            let glyph_id = u16::try_from(info.glyph_id).unwrap_or(0);
            let x_offset = self.to_text_space(position.x_offset);
            glyphs.push(ShapedGlyph {
                glyph_id,
                adjustment: carried - x_offset,
            });
            carried = x_offset + self.embedded_width(glyph_id)
                - self.to_text_space(position.x_advance);
        }

        ShapedText { glyphs }
    }

    fn to_text_space(&self, value: i32) -> i64 {
        (value as f32 * self.scale).round() as i64
    }

    // Same truncation printpdf applies when it writes the /W array.
    fn embedded_width(&self, glyph_id: u16) -> i64 {
        self.face
            .glyph_hor_advance(GlyphId(glyph_id))
            .map(|advance| (f32::from(advance) * self.scale) as i64)
            .unwrap_or(TEXT_SPACE_UNITS as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &[u8] = include_bytes!("../../tests/fixtures/IntakeFixtureDevanagari-Regular.ttf");

    fn fixture() -> FontAsset {
        FontAsset::from_bytes("IntakeFixtureDevanagari-Regular.ttf", FIXTURE.to_vec())
            .expect("fixture font loads")
    }

    fn codepoint_order(text: &str) -> Vec<u16> {
        let face = rustybuzz::ttf_parser::Face::parse(FIXTURE, 0).expect("fixture parses");
        text.chars()
            .map(|ch| face.glyph_index(ch).map(|id| id.0).unwrap_or(0))
            .collect()
    }

    #[test]
    fn pre_base_vowel_sign_moves_before_its_consonant() {
        let font = fixture();
        let shaper = TextShaper::new(&font).expect("shaper");

        let shaped = shaper.shape("लिंग").glyph_ids();
        let naive = codepoint_order("लिंग");

        assert_ne!(shaped, naive);
        assert_eq!(shaped.len(), naive.len());
        // ि is printed first, ahead of ल.
        assert_eq!(shaped[0], naive[1]);
        assert_eq!(shaped[1], naive[0]);
    }

    #[test]
    fn latin_text_keeps_natural_spacing() {
        let font = fixture();
        let shaper = TextShaper::new(&font).expect("shaper");

        let shaped = shaper.shape("Asha Verma");
        assert_eq!(shaped.glyph_ids(), codepoint_order("Asha Verma"));
        assert!(shaped.glyphs().iter().all(|glyph| glyph.adjustment == 0));
    }

    #[test]
    fn empty_text_shapes_to_nothing() {
        let font = fixture();
        let shaper = TextShaper::new(&font).expect("shaper");
        assert!(shaper.shape("").is_empty());
    }
}
