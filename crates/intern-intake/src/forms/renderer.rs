//! Two-pass form drawing: the blank structure first, then the applicant's values.

use super::bilingual::FormattedFieldSet;
use super::layout::{FormField, FormLayout, FormSection, PagePoint};

pub const TITLE_FONT_SIZE: f32 = 16.0;
pub const SECTION_FONT_SIZE: f32 = 14.0;
pub const LABEL_FONT_SIZE: f32 = 12.0;
pub const DATA_FONT_SIZE: f32 = 14.0;

const RULE_THICKNESS: f32 = 1.0;
const UNDERLINE_THICKNESS: f32 = 0.5;

pub const FORM_TITLE: &str = "ONGC Internship Application Form";
pub const FORM_SUBTITLE: &str = "ओएनजीसी इंटर्नशिप आवेदन फॉर्म";

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InkColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl InkColor {
    pub const BLACK: InkColor = InkColor::gray(0.0);
    pub const DARK_GRAY: InkColor = InkColor::gray(0.2);
    pub const LIGHT_GRAY: InkColor = InkColor::gray(0.7);

    pub const fn gray(level: f32) -> Self {
        Self {
            r: level,
            g: level,
            b: level,
        }
    }
}

/// Drawing surface for one form page. All text uses the single font the canvas was built
/// with.
pub trait FormCanvas {
    fn draw_text(&mut self, text: &str, size: f32, origin: PagePoint, color: InkColor);
    fn draw_line(&mut self, start: PagePoint, end: PagePoint, thickness: f32, color: InkColor);
}

pub struct FormRenderer<'a> {
    layout: &'a FormLayout,
}

impl<'a> FormRenderer<'a> {
    pub fn new(layout: &'a FormLayout) -> Self {
        Self { layout }
    }

    /// Title block, section headings and every labelled blank.
    pub fn draw_structure<C: FormCanvas>(&self, canvas: &mut C) {
        let layout = self.layout;

        canvas.draw_text(
            FORM_TITLE,
            TITLE_FONT_SIZE,
            layout.title_origin(),
            InkColor::BLACK,
        );
        canvas.draw_text(
            FORM_SUBTITLE,
            SECTION_FONT_SIZE,
            layout.subtitle_origin(),
            InkColor::DARK_GRAY,
        );
        let (start, end) = layout.title_rule();
        canvas.draw_line(start, end, RULE_THICKNESS, InkColor::BLACK);

        for section in FormSection::ALL {
            self.draw_section(canvas, section);
        }
    }

    fn draw_section<C: FormCanvas>(&self, canvas: &mut C, section: FormSection) {
        let layout = self.layout;

        canvas.draw_text(
            section.heading(),
            SECTION_FONT_SIZE,
            layout.section_origin(section),
            InkColor::BLACK,
        );
        let (start, end) = layout.section_rule(section);
        canvas.draw_line(start, end, RULE_THICKNESS, InkColor::LIGHT_GRAY);

        for slot in layout.slots_in(section) {
            canvas.draw_text(
                slot.label,
                LABEL_FONT_SIZE,
                layout.label_origin(slot),
                InkColor::BLACK,
            );
            let (start, end) = layout.underline(slot);
            canvas.draw_line(start, end, UNDERLINE_THICKNESS, InkColor::LIGHT_GRAY);
        }
    }

    /// Print every non-empty value at its data slot. Returns how many values were drawn.
    pub fn draw_applicant_data<C: FormCanvas>(
        &self,
        canvas: &mut C,
        data: &FormattedFieldSet,
        registration_number: Option<&str>,
    ) -> usize {
        let mut drawn = 0;

        for slot in self.layout.slots() {
            let value = match slot.field {
                FormField::RegistrationNumber => {
                    registration_number.filter(|value| !value.trim().is_empty())
                }
                field => data.value(field),
            };
            let Some(value) = value else {
                continue;
            };

            let origin = self.layout.data_origin(slot);
            if !self.layout.contains(origin) {
                continue;
            }
            canvas.draw_text(value, DATA_FONT_SIZE, origin, InkColor::BLACK);
            drawn += 1;
        }

        drawn
    }
}

/// Draw the full form, structure then data, onto `canvas`.
pub fn render_form<C: FormCanvas>(
    canvas: &mut C,
    layout: &FormLayout,
    data: &FormattedFieldSet,
    registration_number: Option<&str>,
) -> usize {
    let renderer = FormRenderer::new(layout);
    renderer.draw_structure(canvas);
    renderer.draw_applicant_data(canvas, data, registration_number)
}
