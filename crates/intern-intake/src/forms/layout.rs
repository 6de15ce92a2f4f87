//! Fixed coordinate table for the application form.
//!
//! Every label, underline and data slot is derived from one declarative table of
//! `(field, section, column, row)` entries, so the structure pass and the data pass read the
//! same positions. Coordinates are PDF points with the origin at the bottom-left corner.

use super::FormError;

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 50.0;

const TITLE_DROP: f32 = 30.0;
const SUBTITLE_DROP: f32 = 50.0;
const TITLE_RULE_DROP: f32 = 60.0;
const SECTION_RULE_DROP: f32 = 10.0;
const FIRST_ROW_DROP: f32 = 40.0;
const ROW_PITCH: f32 = 30.0;
const UNDERLINE_DROP: f32 = 5.0;
const DATA_INDENT: f32 = 10.0;
const DATA_DROP: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePoint {
    pub x: f32,
    pub y: f32,
}

impl PagePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Logical fields printed on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    Age,
    RegistrationNumber,
    Gender,
    Category,
    Address,
    MobileNo,
    Email,
    ParentName,
    ParentOccupation,
    ParentMobileNo,
    Course,
    Semester,
    LastSemesterSgpa,
    PercentageTwelfth,
    Institute,
    Designation,
    Cpf,
    Section,
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormSection {
    PersonalInformation,
    ParentInformation,
    AcademicDetails,
    EmployeeInformation,
}

impl FormSection {
    pub const ALL: [FormSection; 4] = [
        FormSection::PersonalInformation,
        FormSection::ParentInformation,
        FormSection::AcademicDetails,
        FormSection::EmployeeInformation,
    ];

    pub const fn heading(self) -> &'static str {
        match self {
            FormSection::PersonalInformation => "Personal Information / व्यक्तिगत जानकारी",
            FormSection::ParentInformation => "Parent Information / अभिभावक जानकारी",
            FormSection::AcademicDetails => "Academic Details / शैक्षणिक विवरण",
            FormSection::EmployeeInformation => {
                "ONGC Employee Information (if applicable) / ओएनजीसी कर्मचारी जानकारी"
            }
        }
    }

    /// Distance of the section heading below the top margin.
    const fn drop(self) -> f32 {
        match self {
            FormSection::PersonalInformation => 100.0,
            FormSection::ParentInformation => 200.0,
            FormSection::AcademicDetails => 350.0,
            FormSection::EmployeeInformation => 500.0,
        }
    }

    const fn underline_width(self) -> f32 {
        match self {
            FormSection::PersonalInformation | FormSection::EmployeeInformation => 150.0,
            FormSection::ParentInformation | FormSection::AcademicDetails => 200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    First,
    Second,
    Third,
}

impl Column {
    const fn offset(self) -> f32 {
        match self {
            Column::First => 0.0,
            Column::Second => 200.0,
            Column::Third => 350.0,
        }
    }
}

/// One labelled blank on the form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSlot {
    pub field: FormField,
    pub label: &'static str,
    pub section: FormSection,
    pub column: Column,
    /// 1-based row within the section.
    pub row: u8,
}

const fn slot(
    field: FormField,
    label: &'static str,
    section: FormSection,
    column: Column,
    row: u8,
) -> FieldSlot {
    FieldSlot {
        field,
        label,
        section,
        column,
        row,
    }
}

use Column::{First, Second, Third};
use FormSection::{AcademicDetails, EmployeeInformation, ParentInformation, PersonalInformation};

static FIELD_TABLE: [FieldSlot; 20] = [
    slot(FormField::Name, "नाम/Name:", PersonalInformation, First, 1),
    slot(FormField::Age, "उम्र/Age:", PersonalInformation, Second, 1),
    slot(
        FormField::RegistrationNumber,
        "पंजीकरण संख्या/Registration No.:",
        PersonalInformation,
        Third,
        1,
    ),
    slot(FormField::Gender, "लिंग/Gender:", PersonalInformation, First, 2),
    slot(FormField::Category, "श्रेणी/Category:", PersonalInformation, Second, 2),
    slot(FormField::Address, "पता/Address:", PersonalInformation, First, 3),
    slot(
        FormField::MobileNo,
        "मोबाइल नंबर/Mobile No.:",
        PersonalInformation,
        First,
        4,
    ),
    slot(FormField::Email, "ई-मेल/E-mail:", PersonalInformation, Second, 4),
    slot(
        FormField::ParentName,
        "पिता/माता का नाम/Father/Mother's Name:",
        ParentInformation,
        First,
        1,
    ),
    slot(
        FormField::ParentOccupation,
        "पिता/माता का व्यवसाय/Father/Mother's Occupation:",
        ParentInformation,
        First,
        2,
    ),
    slot(
        FormField::ParentMobileNo,
        "मोबाइल नंबर/Mobile No.:",
        ParentInformation,
        First,
        3,
    ),
    slot(
        FormField::Course,
        "वर्तमान पाठ्यक्रम का नाम/Name of Present Course:",
        AcademicDetails,
        First,
        1,
    ),
    slot(
        FormField::Semester,
        "वर्तमान सेमेस्टर/Present Semester:",
        AcademicDetails,
        First,
        2,
    ),
    slot(
        FormField::LastSemesterSgpa,
        "पिछला सेमेस्टर SGPA/Last Semester SGPA:",
        AcademicDetails,
        First,
        3,
    ),
    slot(
        FormField::PercentageTwelfth,
        "10+2 में प्रतिशत/%age in 10+2:",
        AcademicDetails,
        Second,
        3,
    ),
    slot(
        FormField::Institute,
        "संस्थान का नाम/Name of Institute:",
        AcademicDetails,
        First,
        4,
    ),
    slot(FormField::Designation, "पदनाम/Designation:", EmployeeInformation, First, 1),
    slot(FormField::Cpf, "CPF:", EmployeeInformation, Second, 1),
    slot(FormField::Section, "अनुभाग/Section:", EmployeeInformation, First, 2),
    slot(FormField::Location, "स्थान/Location:", EmployeeInformation, Second, 2),
];

/// Page geometry plus the slot table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self::a4()
    }
}

impl FormLayout {
    pub const fn a4() -> Self {
        Self {
            page_width: PAGE_WIDTH,
            page_height: PAGE_HEIGHT,
            margin: MARGIN,
        }
    }

    fn top(&self) -> f32 {
        self.page_height - self.margin
    }

    pub fn title_origin(&self) -> PagePoint {
        PagePoint::new(self.margin, self.top() - TITLE_DROP)
    }

    pub fn subtitle_origin(&self) -> PagePoint {
        PagePoint::new(self.margin, self.top() - SUBTITLE_DROP)
    }

    pub fn title_rule(&self) -> (PagePoint, PagePoint) {
        self.full_width_rule(self.top() - TITLE_RULE_DROP)
    }

    pub fn section_origin(&self, section: FormSection) -> PagePoint {
        PagePoint::new(self.margin, self.top() - section.drop())
    }

    pub fn section_rule(&self, section: FormSection) -> (PagePoint, PagePoint) {
        self.full_width_rule(self.section_origin(section).y - SECTION_RULE_DROP)
    }

    pub fn label_origin(&self, slot: &FieldSlot) -> PagePoint {
        let section_y = self.section_origin(slot.section).y;
        let row_drop = FIRST_ROW_DROP + ROW_PITCH * f32::from(slot.row.saturating_sub(1));
        PagePoint::new(self.margin + slot.column.offset(), section_y - row_drop)
    }

    pub fn underline(&self, slot: &FieldSlot) -> (PagePoint, PagePoint) {
        let label = self.label_origin(slot);
        let y = label.y - UNDERLINE_DROP;
        (
            PagePoint::new(label.x, y),
            PagePoint::new(label.x + slot.section.underline_width(), y),
        )
    }

    pub fn data_origin(&self, slot: &FieldSlot) -> PagePoint {
        let label = self.label_origin(slot);
        PagePoint::new(label.x + DATA_INDENT, label.y - DATA_DROP)
    }

    pub fn slots(&self) -> &'static [FieldSlot] {
        &FIELD_TABLE
    }

    pub fn slots_in(&self, section: FormSection) -> impl Iterator<Item = &'static FieldSlot> {
        FIELD_TABLE.iter().filter(move |slot| slot.section == section)
    }

    pub fn slot(&self, field: FormField) -> Option<&'static FieldSlot> {
        FIELD_TABLE.iter().find(|slot| slot.field == field)
    }

    pub fn contains(&self, point: PagePoint) -> bool {
        (0.0..=self.page_width).contains(&point.x) && (0.0..=self.page_height).contains(&point.y)
    }

    /// Check that every label, underline end and data slot lands on the page.
    pub fn validate(&self) -> Result<(), FormError> {
        for slot in self.slots() {
            let (_, underline_end) = self.underline(slot);
            for point in [self.label_origin(slot), underline_end, self.data_origin(slot)] {
                if !self.contains(point) {
                    return Err(FormError::OutOfBounds {
                        field: slot.field,
                        x: point.x,
                        y: point.y,
                    });
                }
            }
        }
        Ok(())
    }

    fn full_width_rule(&self, y: f32) -> (PagePoint, PagePoint) {
        (
            PagePoint::new(self.margin, y),
            PagePoint::new(self.page_width - self.margin, y),
        )
    }
}
