use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use printpdf::{Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb};
use tracing::{debug, info};

use super::bilingual::{format_applicant_data, ApplicantFormData};
use super::font::FontAsset;
use super::layout::{FormLayout, PagePoint};
use super::renderer::{FormCanvas, FormRenderer, InkColor};
use super::shaping::TextShaper;
use super::FormError;

pub const APPLICATION_FORM_TITLE: &str = "ONGC Internship Application Form";

const PT_TO_MM: f32 = 0.352_777_78;

fn mm(points: f32) -> Mm {
    Mm(points * PT_TO_MM)
}

#[derive(Debug, Clone)]
enum FontSource {
    Path(PathBuf),
    Loaded(Arc<FontAsset>),
}

/// Builds the filled application form PDF for one applicant.
#[derive(Debug, Clone)]
pub struct FormAssembler {
    font: FontSource,
    layout: FormLayout,
}

impl FormAssembler {
    /// Read the font from `path` on every call.
    pub fn from_font_path(path: impl Into<PathBuf>) -> Self {
        Self {
            font: FontSource::Path(path.into()),
            layout: FormLayout::a4(),
        }
    }

    /// Reuse an already decoded font across calls.
    pub fn with_font(font: Arc<FontAsset>) -> Self {
        Self {
            font: FontSource::Loaded(font),
            layout: FormLayout::a4(),
        }
    }

    pub fn font_path(&self) -> &Path {
        match &self.font {
            FontSource::Path(path) => path,
            FontSource::Loaded(font) => font.path(),
        }
    }

    fn load_font(&self) -> Result<Arc<FontAsset>, FormError> {
        match &self.font {
            FontSource::Path(path) => FontAsset::load(path).map(Arc::new),
            FontSource::Loaded(font) => Ok(Arc::clone(font)),
        }
    }

    /// Render a single-page form for `applicant`. Any failure aborts before bytes are
    /// produced.
    pub fn create_application_form(
        &self,
        applicant: &ApplicantFormData,
        registration_number: Option<&str>,
    ) -> Result<Vec<u8>, FormError> {
        let font = self.load_font()?;
        let shaper = TextShaper::new(&font)?;
        self.layout.validate()?;

        let (doc, page, layer) = PdfDocument::new(
            APPLICATION_FORM_TITLE,
            mm(self.layout.page_width),
            mm(self.layout.page_height),
            "Form",
        );
        let font_ref = doc
            .add_external_font(Cursor::new(font.bytes()))
            .map_err(|err| FormError::FontEmbedding(err.to_string()))?;
        debug!(font = ?font.family(), "font embedded");

        let formatted = format_applicant_data(applicant);

        let drawn = {
            let mut canvas = PdfLayerCanvas {
                layer: doc.get_page(page).get_layer(layer),
                font: &font_ref,
                shaper: &shaper,
            };
            let renderer = FormRenderer::new(&self.layout);
            renderer.draw_structure(&mut canvas);
            renderer.draw_applicant_data(&mut canvas, &formatted, registration_number)
        };

        let mut buffer = Vec::new();
        {
            let mut writer = BufWriter::new(Cursor::new(&mut buffer));
            doc.save(&mut writer)
                .map_err(|err| FormError::Serialization(err.to_string()))?;
        }

        info!(
            fields = drawn,
            bytes = buffer.len(),
            registration = registration_number.unwrap_or(""),
            "application form created"
        );
        Ok(buffer)
    }
}

struct PdfLayerCanvas<'a> {
    layer: PdfLayerReference,
    font: &'a IndirectFontRef,
    shaper: &'a TextShaper<'a>,
}

impl From<InkColor> for Color {
    fn from(value: InkColor) -> Self {
        Color::Rgb(Rgb::new(value.r, value.g, value.b, None))
    }
}

impl FormCanvas for PdfLayerCanvas<'_> {
    fn draw_text(&mut self, text: &str, size: f32, origin: PagePoint, color: InkColor) {
        let shaped = self.shaper.shape(text);
        if shaped.is_empty() {
            return;
        }
        self.layer.set_fill_color(color.into());
        self.layer.begin_text_section();
        self.layer.set_font(self.font, size);
        self.layer.set_text_cursor(mm(origin.x), mm(origin.y));
        self.layer.write_positioned_codepoints(shaped.positioned());
        self.layer.end_text_section();
    }

    fn draw_line(&mut self, start: PagePoint, end: PagePoint, thickness: f32, color: InkColor) {
        self.layer.set_outline_color(color.into());
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(mm(start.x), mm(start.y)), false),
                (Point::new(mm(end.x), mm(end.y)), false),
            ],
            is_closed: false,
        });
    }
}
